use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{DatasetDescriptor, TimeSeries, default_descriptors};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Descriptors for a loaded dataset
// ---------------------------------------------------------------------------

/// The built-in descriptors whose channel is present in `series`, followed
/// by one descriptor per extra channel, labelled with its key and coloured
/// from [`generate_palette`].
pub fn descriptors_for(series: &TimeSeries) -> Vec<DatasetDescriptor> {
    let mut descriptors: Vec<DatasetDescriptor> = default_descriptors()
        .into_iter()
        .filter(|d| series.channel(&d.key).is_some())
        .collect();
    let extra: Vec<String> = series
        .channel_keys()
        .filter(|key| !descriptors.iter().any(|d| d.key == *key))
        .map(str::to_string)
        .collect();

    let palette = generate_palette(extra.len());
    descriptors.extend(
        extra
            .iter()
            .zip(palette)
            .map(|(key, color)| DatasetDescriptor::new(key, key, color)),
    );
    descriptors
}
