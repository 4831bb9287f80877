//! Versioned binary serialization of [`SdfGrid`].
//!
//! The format is little-endian throughout and begins with a `u32` schema
//! version. Older versions are migrated on read; versions newer than
//! [`SCHEMA_VERSION`] are rejected.

use std::io::{Read, Write};

use nalgebra::{Point3, Vector3};

use crate::bounds::Aabb;
use crate::error::{GridError, GridResult};
use crate::grid::SdfGrid;
use crate::octahedral::Octahedron;
use crate::settings::{SweepAxis, VoxelizationSettings};
use crate::size::GridSize;

/// First serialized revision. Predates the normal array; data in this
/// version is not worth migrating and reads back as `None`.
const VERSION_FIRST: u32 = 1;

/// Added the packed normal array and stored bounds as center + half extents.
const VERSION_ADD_NORMALS: u32 = 2;

/// Switched bounds storage to explicit min/max corners.
const VERSION_MIN_MAX_BOUNDS: u32 = 3;

/// The schema version written by this build.
pub const SCHEMA_VERSION: u32 = VERSION_MIN_MAX_BOUNDS;

impl SdfGrid {
    /// Serialize the grid at [`SCHEMA_VERSION`].
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Io`] if the writer fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> GridResult<()> {
        write_u32(writer, SCHEMA_VERSION)?;

        let bounds = self.mesh_bounds();
        write_point(writer, bounds.min)?;
        write_point(writer, bounds.max)?;

        write_u32(writer, self.voxel_size())?;
        write_f32(writer, self.max_smoothness())?;

        let settings = self.settings();
        writer.write_all(&[
            settings.sweep_axis.to_u8(),
            u8::from(settings.reverse_sweep),
            u8::from(settings.watertight),
            u8::from(settings.hide_leaks),
        ])?;

        write_vector(writer, self.origin())?;

        let size = self.size();
        write_u32(writer, size.x)?;
        write_u32(writer, size.y)?;
        write_u32(writer, size.z)?;

        write_u64(writer, self.distance_field().len() as u64)?;
        for &distance in self.distance_field() {
            write_f32(writer, distance)?;
        }

        write_u64(writer, self.normals().len() as u64)?;
        for normal in self.normals() {
            writer.write_all(&[normal.x, normal.y])?;
        }

        Ok(())
    }

    /// Serialize the grid to a byte vector.
    ///
    /// # Errors
    ///
    /// Does not fail in practice; the error type matches [`SdfGrid::write_to`].
    pub fn to_bytes(&self) -> GridResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.len() * 6 + 64);
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Deserialize a grid, migrating older versions.
    ///
    /// Returns `Ok(None)` for data serialized before the normal array
    /// existed; such grids must be rebuilt from their source mesh.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnsupportedVersion`] for versions newer than
    /// [`SCHEMA_VERSION`], [`GridError::UnexpectedEof`] for truncated data,
    /// and [`GridError::InvalidContent`] for corrupt field encodings.
    pub fn read_from<R: Read>(reader: &mut R) -> GridResult<Option<Self>> {
        let version = read_u32(reader, "version")?;
        if version > SCHEMA_VERSION {
            return Err(GridError::UnsupportedVersion {
                version,
                latest: SCHEMA_VERSION,
            });
        }
        if version <= VERSION_FIRST {
            return Ok(None);
        }

        let mesh_bounds = if version < VERSION_MIN_MAX_BOUNDS {
            // Stored as center + half extents before min/max corners
            let center = read_point(reader, "bounds center")?;
            let half_extents = read_vector(reader, "bounds extents")?;
            Aabb::new(center - half_extents, center + half_extents)
        } else {
            let min = read_point(reader, "bounds min")?;
            let max = read_point(reader, "bounds max")?;
            Aabb::new(min, max)
        };

        let voxel_size = read_u32(reader, "voxel size")?;
        let max_smoothness = read_f32(reader, "max smoothness")?;

        let mut settings_bytes = [0_u8; 4];
        read_exact(reader, &mut settings_bytes, "settings")?;
        let sweep_axis = SweepAxis::from_u8(settings_bytes[0]).ok_or_else(|| {
            GridError::invalid_content(format!("unknown sweep axis tag {}", settings_bytes[0]))
        })?;
        let settings = VoxelizationSettings {
            sweep_axis,
            reverse_sweep: settings_bytes[1] != 0,
            watertight: settings_bytes[2] != 0,
            hide_leaks: settings_bytes[3] != 0,
        };

        let origin = read_vector(reader, "origin")?;
        let size = GridSize::new(
            read_u32(reader, "size x")?,
            read_u32(reader, "size y")?,
            read_u32(reader, "size z")?,
        );

        let distance_count = read_len(reader, "distance count")?;
        let mut distance_field = Vec::with_capacity(distance_count.min(1 << 20));
        for _ in 0..distance_count {
            distance_field.push(read_f32(reader, "distance")?);
        }

        let normal_count = read_len(reader, "normal count")?;
        let mut normals = Vec::with_capacity(normal_count.min(1 << 20));
        for _ in 0..normal_count {
            let mut pair = [0_u8; 2];
            read_exact(reader, &mut pair, "normal")?;
            normals.push(Octahedron {
                x: pair[0],
                y: pair[1],
            });
        }

        let grid = Self::new(
            mesh_bounds,
            voxel_size,
            max_smoothness,
            settings,
            origin,
            size,
            distance_field,
            normals,
        )?;
        Ok(Some(grid))
    }

    /// Deserialize a grid from a byte slice. See [`SdfGrid::read_from`].
    ///
    /// # Errors
    ///
    /// Same as [`SdfGrid::read_from`].
    pub fn from_bytes(mut bytes: &[u8]) -> GridResult<Option<Self>> {
        Self::read_from(&mut bytes)
    }
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], field: &'static str) -> GridResult<()> {
    reader.read_exact(buf).map_err(|error| {
        if error.kind() == std::io::ErrorKind::UnexpectedEof {
            GridError::UnexpectedEof { field }
        } else {
            GridError::Io(error)
        }
    })
}

fn read_u32<R: Read>(reader: &mut R, field: &'static str) -> GridResult<u32> {
    let mut buf = [0_u8; 4];
    read_exact(reader, &mut buf, field)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R, field: &'static str) -> GridResult<u64> {
    let mut buf = [0_u8; 8];
    read_exact(reader, &mut buf, field)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_len<R: Read>(reader: &mut R, field: &'static str) -> GridResult<usize> {
    let len = read_u64(reader, field)?;
    usize::try_from(len)
        .map_err(|_| GridError::invalid_content(format!("{field} {len} exceeds address space")))
}

fn read_f32<R: Read>(reader: &mut R, field: &'static str) -> GridResult<f32> {
    let mut buf = [0_u8; 4];
    read_exact(reader, &mut buf, field)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_point<R: Read>(reader: &mut R, field: &'static str) -> GridResult<Point3<f32>> {
    Ok(Point3::new(
        read_f32(reader, field)?,
        read_f32(reader, field)?,
        read_f32(reader, field)?,
    ))
}

fn read_vector<R: Read>(reader: &mut R, field: &'static str) -> GridResult<Vector3<f32>> {
    Ok(read_point(reader, field)?.coords)
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> GridResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_u64<W: Write>(writer: &mut W, value: u64) -> GridResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f32<W: Write>(writer: &mut W, value: f32) -> GridResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_point<W: Write>(writer: &mut W, point: Point3<f32>) -> GridResult<()> {
    write_f32(writer, point.x)?;
    write_f32(writer, point.y)?;
    write_f32(writer, point.z)
}

fn write_vector<W: Write>(writer: &mut W, vector: Vector3<f32>) -> GridResult<()> {
    write_f32(writer, vector.x)?;
    write_f32(writer, vector.y)?;
    write_f32(writer, vector.z)
}
