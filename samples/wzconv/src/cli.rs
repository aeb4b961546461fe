use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueHint;
use nalgebra::Vector3;
use wzmodel::{Axis, Format, PieVersion};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum LogFormat {
    Compact,
    Full,
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => f.write_str("compact"),
            LogFormat::Full => f.write_str("full"),
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Output format names accepted on the command line.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum OutputFormat {
    Wzm,
    Pie2,
    Pie3,
    Obj,
}

impl From<OutputFormat> for Format {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Wzm => Format::Wzm,
            OutputFormat::Pie2 => Format::Pie(PieVersion::V2),
            OutputFormat::Pie3 => Format::Pie(PieVersion::V3),
            OutputFormat::Obj => Format::Obj,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("can't tell the output format of {0:?}; pass --format")]
    OutputFormat(PathBuf),
    #[error(transparent)]
    Model(#[from] wzmodel::Error),
}

#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Logging output filters; comma-separated
    #[arg(
        short,
        long,
        default_value = "warn,wzmodel=info,pie=info,wzconv=info",
        env = "WZCONV_LOG_FILTER"
    )]
    pub log_filter: String,
    /// Logging output format
    #[arg(long, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
    /// Output format; guessed from the output extension when absent (`.pie` means PIE 3)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,
    /// Scaling applied before saving
    #[arg(short, long, value_parser = parse_vec3::<f32>, value_name = "X,Y,Z")]
    pub scale: Option<Vector3<f32>>,
    /// Mirror across the plane perpendicular to this axis
    #[arg(short, long, value_name = "AXIS")]
    pub mirror: Option<Axis>,
    /// Flip the front face of every triangle
    #[arg(short, long)]
    pub reverse_winding: bool,
    /// Apply transforms to this mesh only
    #[arg(long, value_name = "INDEX")]
    pub mesh: Option<usize>,
    /// Model to read
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,
    /// Model to write
    #[arg(value_hint = ValueHint::FilePath)]
    pub output: PathBuf,
}

impl Cli {
    pub fn output_format(&self) -> Result<Format, CliError> {
        if let Some(f) = self.format {
            return Ok(f.into());
        }
        output_format_for(&self.output).ok_or_else(|| CliError::OutputFormat(self.output.clone()))
    }
}

/// The output file may not exist yet, so `.pie` can't be probed.
fn output_format_for(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "wzm" => Some(Format::Wzm),
        "pie" => Some(Format::Pie(PieVersion::V3)),
        "obj" => Some(Format::Obj),
        _ => None,
    }
}

fn parse_vec3<R: FromStr>(
    s: &str,
) -> Result<Vector3<R>, Box<dyn std::error::Error + Send + Sync + 'static>>
where
    <R as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let mut split = s.trim().split(',');
    let mut next = || split.next().ok_or("expected three comma-separated values");
    let x = R::from_str(next()?.trim())?;
    let y = R::from_str(next()?.trim())?;
    let z = R::from_str(next()?.trim())?;
    if split.next().is_some() {
        return Err("expected three comma-separated values".into());
    }
    Ok(nalgebra::vector![x, y, z])
}

/// Set up pretty log output
pub(crate) fn initialize_tracing(log_filter: &str, log_format: LogFormat) {
    let tsub = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::OffsetTime::new(
            time::UtcOffset::current_local_offset().unwrap_or_else(|e| {
                tracing::warn!("couldn't get local time offset: {:?}", e);
                time::UtcOffset::UTC
            }),
            time::macros::format_description!("[hour]:[minute]:[second]"),
        ))
        .with_env_filter(log_filter);

    match log_format {
        LogFormat::Compact => tsub.compact().init(),
        LogFormat::Full => tsub.init(),
        LogFormat::Pretty => tsub.pretty().init(),
        LogFormat::Json => tsub.json().init(),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parses_a_full_command_line() {
        let cli = Cli::try_parse_from([
            "wzconv", "--scale", "2, 1,1", "--mirror", "y", "-r", "--mesh", "1", "in.pie",
            "out.obj",
        ])
        .unwrap();
        assert_eq!(cli.scale, Some(nalgebra::vector![2.0, 1.0, 1.0]));
        assert_eq!(cli.mirror, Some(Axis::Y));
        assert!(cli.reverse_winding);
        assert_eq!(cli.mesh, Some(1));
        assert_eq!(cli.output_format().unwrap(), Format::Obj);
    }

    #[test]
    fn output_format() {
        let cli = Cli::try_parse_from(["wzconv", "a.wzm", "b.PIE"]).unwrap();
        assert_eq!(cli.output_format().unwrap(), Format::Pie(PieVersion::V3));
        let cli = Cli::try_parse_from(["wzconv", "-f", "pie2", "a.wzm", "b.txt"]).unwrap();
        assert_eq!(cli.output_format().unwrap(), Format::Pie(PieVersion::V2));
        let cli = Cli::try_parse_from(["wzconv", "a.wzm", "b.txt"]).unwrap();
        assert!(cli.output_format().is_err());
    }

    #[test]
    fn bad_vectors() {
        assert!(parse_vec3::<f32>("1,2").is_err());
        assert!(parse_vec3::<f32>("1,2,3,4").is_err());
        assert!(parse_vec3::<f32>("1,x,3").is_err());
    }
}
