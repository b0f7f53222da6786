//! Materialize a loaded alignment as scene objects.

use glam::DVec3;

use super::{
    BoxShape, ImagePair, ObjectId, OriginMarker, SceneHost, SceneObjects,
    Shape,
};
use crate::error::InspectError;
use crate::io::LoadedAlignment;
use crate::options::AppearanceOptions;
use crate::transform::{
    axes_extent, depth_offset, volume_transform, ImageBasis, ImagePlane,
};

/// Create the axes, volume, image containers and every image pair for
/// `loaded`, positioned for its first section with all images hidden.
///
/// On failure every object created so far is deleted again, so the host is
/// left as it was found.
///
/// # Errors
///
/// Returns [`InspectError::SectionOutOfRange`] when a section z-index is
/// past the end of the tilt series, or the first host error.
pub fn build_scene<H: SceneHost + ?Sized>(
    host: &mut H,
    loaded: &LoadedAlignment,
    appearance: &AppearanceOptions,
) -> Result<SceneObjects, InspectError> {
    let alignment = &loaded.alignment;
    let dim = alignment.volume_dimension();

    let (basis, count) = match &loaded.tilt_series {
        Some(ts) => (
            ImageBasis::TiltSeries {
                width_px: ts.header.nx,
                height_px: ts.header.ny,
                step: ts.header.pixel_step(),
            },
            ts.header.nz as usize,
        ),
        None => (
            ImageBasis::Declared {
                width: dim.x,
                height: dim.y,
            },
            alignment.max_z_index() + 1,
        ),
    };

    if let Some(bad) =
        alignment.sections().iter().find(|s| s.z_index >= count)
    {
        return Err(InspectError::SectionOutOfRange {
            z_index: bad.z_index,
            available: count,
        });
    }

    let plane = ImagePlane {
        basis,
        z_offset: depth_offset(dim),
    };

    let mut created = Vec::new();
    match build_objects(host, loaded, appearance, plane, count, &mut created) {
        Ok(objects) => {
            log::debug!(
                "built scene: {} image pairs, {} sections aligned",
                objects.images.len(),
                alignment.len()
            );
            Ok(objects)
        }
        Err(e) => {
            log::debug!(
                "scene build failed, removing {} objects",
                created.len()
            );
            for id in created.into_iter().rev() {
                if host.is_live(id) {
                    host.delete(id);
                }
            }
            Err(e)
        }
    }
}

fn build_objects<H: SceneHost + ?Sized>(
    host: &mut H,
    loaded: &LoadedAlignment,
    appearance: &AppearanceOptions,
    plane: ImagePlane,
    count: usize,
    created: &mut Vec<ObjectId>,
) -> Result<SceneObjects, InspectError> {
    let alignment = &loaded.alignment;
    let dim = alignment.volume_dimension();

    let axes = host.create(
        "axes",
        Shape::Axes {
            extent: axes_extent(dim),
            z_offset: plane.z_offset,
            colors: appearance.axis_colors,
        },
        None,
    )?;
    created.push(axes);

    let volume_shape = match &loaded.volume_file {
        Some(location) => Shape::VolumeFile {
            location: location.clone(),
        },
        None => Shape::Box(BoxShape {
            size: loaded.convention.coord_order.local_extent(dim),
            color: appearance.volume_color,
            transparency: appearance.volume_transparency,
            marker: Some(OriginMarker {
                radius: appearance.origin_radius,
                color: appearance.origin_color,
            }),
        }),
    };
    let volume = host.create("volume", volume_shape, None)?;
    created.push(volume);
    let first_tilt = alignment.section(0).map_or(0.0, |s| s.tilt_angle);
    host.set_position(
        volume,
        volume_transform(dim, &loaded.convention, first_tilt),
    )?;

    let raw_group = host.create("raw tiltseries", Shape::Group, None)?;
    created.push(raw_group);
    let aligned_group = host.create("aligned tiltseries", Shape::Group, None)?;
    created.push(aligned_group);

    let extent = plane.basis.extent();
    let base = plane.base_transform();
    let mut images = Vec::with_capacity(count);
    for z in 0..count {
        let aligned_shape = match &loaded.tilt_series {
            Some(ts) => Shape::ImageSection {
                location: ts.location.clone(),
                section: z,
            },
            None => Shape::Box(BoxShape {
                size: DVec3::new(
                    extent.x,
                    extent.y,
                    appearance.aligned_thickness,
                ),
                color: appearance.aligned_color,
                transparency: appearance.aligned_transparency,
                marker: None,
            }),
        };
        let aligned = host.create(
            &format!("aligned image {z}"),
            aligned_shape,
            Some(aligned_group),
        )?;
        let raw = host.create(
            &format!("raw image {z}"),
            Shape::Box(BoxShape {
                size: DVec3::new(extent.x, extent.y, appearance.raw_thickness),
                color: appearance.raw_color,
                transparency: appearance.raw_transparency,
                marker: None,
            }),
            Some(raw_group),
        )?;

        let position = alignment
            .section_for_z(z)
            .map_or(base, |section| plane.image_transform(section));
        host.set_position(aligned, position)?;
        host.set_position(raw, plane.raw_transform())?;
        host.set_visible(aligned, false)?;
        host.set_visible(raw, false)?;
        images.push(ImagePair { aligned, raw });
    }

    Ok(SceneObjects {
        axes,
        volume,
        raw_group,
        aligned_group,
        images,
        plane,
    })
}
