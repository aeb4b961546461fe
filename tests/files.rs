use std::fs;

use wzmodel::{Format, Mesh, MeshSelection, Model, PieVersion};

const PIE3_TANK: &str = "PIE 3
TYPE 10200
TEXTURE 0 page-17.png 0 0
LEVELS 2
LEVEL 1
POINTS 4
\t-8 0 -8
\t-8 0 8
\t8 0 8
\t8 0 -8
POLYGONS 2
\t200 3 0 1 2 0 0 0 1 1 1
\t200 3 0 2 3 0 0 1 1 1 0
CONNECTORS 1
\t0 12 0
LEVEL 2
POINTS 3
\t0 4 0
\t0 4 6
\t4 4 0
POLYGONS 1
\t4200 3 0 1 2 2 250 0.5 0.5 0 0 0 0.5 0.5 0
ANIMOBJECT 2
\t0 0 0 0 0 0 0
\t1000 0 0 0 0 360 0
";

fn write_tank(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("tank.PIE");
    fs::write(&path, PIE3_TANK).unwrap();
    path
}

#[test]
fn load_detects_pie_version_from_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_tank(&dir);
    assert_eq!(Format::from_path(&path).unwrap(), Format::Pie(PieVersion::V3));

    let model = wzmodel::load(&path).unwrap();
    assert_eq!(model.mesh_count(), 2);
    assert_eq!(model.texture(), Some("page-17.png"));
    assert!(model.meshes().iter().all(Mesh::team_colours));
    assert_eq!(model.mesh(0).unwrap().connector_count(), 1);
    assert_eq!(model.mesh(1).unwrap().frame_count(), 2);
}

#[test]
fn convert_through_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let model = wzmodel::load(write_tank(&dir)).unwrap();

    let wzm = dir.path().join("tank.wzm");
    wzmodel::save(&wzm, Format::Wzm, &model).unwrap();
    assert_eq!(wzmodel::load(&wzm).unwrap(), model);

    let obj = dir.path().join("tank.obj");
    wzmodel::save(&obj, Format::Obj, &model).unwrap();
    let from_obj = wzmodel::load(&obj).unwrap();
    assert_eq!(from_obj.mesh_count(), 2);
    for (a, b) in model.meshes().iter().zip(from_obj.meshes()) {
        assert_eq!(a.vertex_count(), b.vertex_count());
        assert_eq!(a.index_count(), b.index_count());
    }

    let old = dir.path().join("tank-v2.pie");
    wzmodel::save(&old, Format::Pie(PieVersion::V2), &model).unwrap();
    assert_eq!(Format::from_path(&old).unwrap(), Format::Pie(PieVersion::V2));
    let text = fs::read_to_string(&old).unwrap();
    // PIE 2 keeps one frame and no texture arrays
    assert!(text.contains("ANIMOBJECT 1\n"));
    assert!(!text.contains("NORMALS"));
    let downgraded = wzmodel::load(&old).unwrap();
    assert_eq!(downgraded.mesh(1).unwrap().frame_count(), 1);
    assert_eq!(
        downgraded.mesh(0).unwrap().positions(),
        model.mesh(0).unwrap().positions()
    );
}

#[test]
fn unknown_extension_falls_back_to_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tank.model");
    fs::write(&path, PIE3_TANK).unwrap();
    assert_eq!(wzmodel::load(&path).unwrap().mesh_count(), 2);

    let junk = dir.path().join("junk.bin");
    fs::write(&junk, [0u8, 159, 146, 150]).unwrap();
    assert!(matches!(
        wzmodel::load(&junk),
        Err(wzmodel::Error::UnknownFormat)
    ));
}

#[test]
fn failed_load_produces_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.wzm");
    let mut text = Vec::new();
    let mut model = Model::new();
    let mut mesh = Mesh::with_name("only");
    mesh.add_connector(wzmodel::Connector::new(1.0, 2.0, 3.0));
    model.push(mesh);
    model.write(&mut text).unwrap();
    text.truncate(text.len() - 4);
    fs::write(&path, text).unwrap();
    assert!(wzmodel::load(&path).is_err());
}

#[test]
fn transforms_then_save() {
    let dir = tempfile::tempdir().unwrap();
    let mut model = wzmodel::load(write_tank(&dir)).unwrap();
    model.scale(MeshSelection::All, 0.5, 0.5, 0.5).unwrap();
    let bounds = model.bounds();
    assert_eq!(bounds.maxs.x, 4.0);
    assert_eq!(bounds.mins.z, -4.0);

    let out = dir.path().join("small.wzm");
    wzmodel::save(&out, Format::Wzm, &model).unwrap();
    assert_eq!(wzmodel::load(&out).unwrap().bounds(), bounds);
}
