use std::io::Cursor;

use nalgebra::{point, vector};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use wzmodel::{uv, Axis, Connector, Frame, IndexedTri, Mesh, Model, Point};

/// A finite coordinate; thirds make sure the text form is not always short.
fn coord(g: &mut Gen) -> f32 {
    match u8::arbitrary(g) % 8 {
        0 => -0.0,
        1 => f32::from(i16::arbitrary(g)) / 3.0,
        _ => f32::from(i16::arbitrary(g)) / 16.0,
    }
}

fn unit(g: &mut Gen) -> f32 {
    f32::from(i8::arbitrary(g)) / 127.0
}

fn name(g: &mut Gen) -> String {
    let words = ["body", "turret", "left track", "Böse", "x", ""];
    g.choose(&words).copied().unwrap_or_default().to_owned()
}

#[derive(Debug, Clone)]
struct ArbMesh(Mesh);

impl Arbitrary for ArbMesh {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut mesh = Mesh::with_name(name(g));
        mesh.set_team_colours(bool::arbitrary(g));

        let points = usize::arbitrary(g) % 12;
        for _ in 0..points {
            mesh.add_point(Point {
                position: vector![coord(g), coord(g), coord(g)],
                uv: uv(unit(g), unit(g)),
                normal: vector![unit(g), unit(g), unit(g)],
            });
        }
        if points > 0 {
            for _ in 0..usize::arbitrary(g) % 16 {
                let mut index = || u32::arbitrary(g) % points as u32;
                mesh.add_indices(IndexedTri::new(index(), index(), index()));
            }
        }
        for _ in 0..usize::arbitrary(g) % 3 {
            mesh.add_connector(Connector::new(coord(g), coord(g), coord(g)));
        }
        for _ in 0..usize::arbitrary(g) % 3 {
            mesh.add_frame(Frame {
                time: f32::from(u16::arbitrary(g)),
                translation: vector![coord(g), coord(g), coord(g)],
                rotation: vector![coord(g), coord(g), coord(g)],
            });
        }
        // only fails on bad indices, which are never generated
        mesh.finish_import().unwrap();
        Self(mesh)
    }
}

#[derive(Debug, Clone)]
struct ArbModel(Model);

impl Arbitrary for ArbModel {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut model = Model::new();
        if bool::arbitrary(g) {
            model.set_texture(Some("page-17-tank.png".to_owned()));
        }
        for _ in 0..usize::arbitrary(g) % 4 {
            model.push(ArbMesh::arbitrary(g).0);
        }
        Self(model)
    }
}

#[quickcheck]
fn wzm_round_trip_is_exact(model: ArbModel) -> bool {
    let mut out = Vec::new();
    model.0.write(&mut out).unwrap();
    Model::read(Cursor::new(out)).unwrap() == model.0
}

#[quickcheck]
fn reverse_winding_twice_is_identity(mesh: ArbMesh) -> bool {
    let mut m = mesh.0.clone();
    m.reverse_winding();
    m.reverse_winding();
    m == mesh.0
}

#[quickcheck]
fn mirror_twice_is_identity(mesh: ArbMesh, axis: u8) -> bool {
    let axis = Axis::try_from(usize::from(axis % 3)).unwrap();
    let mut m = mesh.0.clone();
    m.mirror_from_point(&point![0.0, 0.0, 0.0], axis);
    m.mirror_from_point(&point![0.0, 0.0, 0.0], axis);
    m == mesh.0
}

#[quickcheck]
fn mirror_about_local_center_restores_geometry(mesh: ArbMesh) -> bool {
    let mut m = mesh.0.clone();
    m.mirror_using_local_center(Axis::Z);
    m.mirror_using_local_center(Axis::Z);
    let scale = 1.0 + mesh.0.positions().iter().map(|p| p.norm()).fold(0.0, f32::max);
    m.triangles() == mesh.0.triangles()
        && m.positions()
            .iter()
            .zip(mesh.0.positions())
            .all(|(a, b)| (a - b).norm() <= 1e-4 * scale)
}

#[quickcheck]
fn obj_export_import_keeps_counts(model: ArbModel) -> bool {
    let mut out = Vec::new();
    model.0.export_obj(&mut out).unwrap();
    let again = Model::import_obj(Cursor::new(out)).unwrap();
    // tobj only emits objects that have faces
    let with_faces: Vec<_> = model.0.meshes().iter().filter(|m| m.index_count() > 0).collect();
    with_faces.len() == again.mesh_count()
        && with_faces.iter().zip(again.meshes()).all(|(a, b)| {
            b.index_count() == a.index_count() && b.vertex_count() <= a.vertex_count()
        })
}

#[quickcheck]
fn pie3_round_trip_keeps_geometry(mesh: ArbMesh) -> bool {
    let level = mesh.0.back_convert();
    let again = Mesh::try_from(&level).unwrap().back_convert();
    let corners = |l: &pie::Pie3Level| -> Vec<_> {
        l.polygons
            .iter()
            .flat_map(|p| p.indices.iter().zip(p.texcoords).map(|(&i, t)| (l.points[i as usize], t)))
            .collect()
    };
    again.polygons.len() == level.polygons.len() && corners(&again) == corners(&level)
}
