//! Section selection: place the volume for one section and show only its
//! image pair.

use crate::alignment::SectionParams;
use crate::error::InspectError;
use crate::scene::SceneHost;
use crate::session::LiveScene;
use crate::transform::volume_transform;

/// Tilt the volume for `section` and show the image pair at its z-index,
/// hiding every other pair. Applying the same section twice leaves the
/// scene as after the first time.
///
/// # Errors
///
/// Returns the first host error.
pub fn apply_section<H: SceneHost + ?Sized>(
    host: &mut H,
    live: &LiveScene,
    section: &SectionParams,
) -> Result<(), InspectError> {
    let loaded = &live.loaded;
    host.set_position(
        live.objects.volume,
        volume_transform(
            loaded.alignment.volume_dimension(),
            &loaded.convention,
            section.tilt_angle,
        ),
    )?;
    for (position, pair) in live.objects.images.iter().enumerate() {
        let shown = position == section.z_index;
        host.set_visible(pair.aligned, shown)?;
        host.set_visible(pair.raw, shown)?;
    }
    Ok(())
}

/// Select the section in table row `row`. Returns its z-index, or `None`
/// when the row does not exist.
///
/// # Errors
///
/// Returns the first host error.
pub fn select_row<H: SceneHost + ?Sized>(
    host: &mut H,
    live: &mut LiveScene,
    row: usize,
) -> Result<Option<usize>, InspectError> {
    let Some(section) = live.table.row(row).copied() else {
        log::debug!("row {row} out of range ({} rows)", live.table.len());
        return Ok(None);
    };
    apply_section(host, live, &section)?;
    live.selected_row = Some(row);
    Ok(Some(section.z_index))
}

/// Select from a slider spanning `0..=rows - 1`.
///
/// # Errors
///
/// Returns the first host error.
pub fn select_slider<H: SceneHost + ?Sized>(
    host: &mut H,
    live: &mut LiveScene,
    value: i64,
) -> Result<Option<usize>, InspectError> {
    match usize::try_from(value) {
        Ok(row) => select_row(host, live, row),
        Err(_) => {
            log::debug!("slider value {value} out of range");
            Ok(None)
        }
    }
}

/// Select the section carrying z-index `z_index`.
///
/// # Errors
///
/// Returns the first host error.
pub fn select_z<H: SceneHost + ?Sized>(
    host: &mut H,
    live: &mut LiveScene,
    z_index: usize,
) -> Result<Option<usize>, InspectError> {
    match live.loaded.alignment.position_of_z(z_index) {
        Some(row) => select_row(host, live, row),
        None => {
            log::debug!("no section with z-index {z_index}");
            Ok(None)
        }
    }
}
