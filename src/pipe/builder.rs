//! The canonical editing pipe.
//!
//! Every image opened in the editor gets the same chain: exposure,
//! contrast, tone curve, lightness mask, saturation, five color editors
//! and a final geometry stage. Editing only ever changes parameters, so
//! two images differ by their parameter sets, never by pipe shape.

use crate::core::image::Image;
use crate::pipe::pipe::ProcessPipe;
use crate::transforms::{
    ColorEditor, Contrast, Exposure, Geometry, LightnessMask, Saturation, ToneCurve,
};

/// Number of color editor slots in the canonical pipe.
pub const COLOR_EDITOR_COUNT: usize = 5;

/// Build the canonical editing pipe with default parameters everywhere.
pub fn default_pipe() -> ProcessPipe {
    let mut pipe = ProcessPipe::new();
    append_default_nodes(&mut pipe);
    pipe
}

/// Same chain, but processing at full resolution (for export tiles).
pub fn full_resolution_pipe() -> ProcessPipe {
    let mut pipe = ProcessPipe::new_full_resolution();
    append_default_nodes(&mut pipe);
    pipe
}

/// Build the canonical pipe around an image, ready to compute.
pub fn pipe_for_image(image: Image) -> ProcessPipe {
    let mut pipe = default_pipe();
    pipe.set_image(image);
    pipe
}

fn append_default_nodes(pipe: &mut ProcessPipe) {
    // names are fixed; appends on an empty pipe with default params
    // cannot collide or fail validation
    let stages: Vec<(Box<dyn crate::pipe::Transform>, String)> = {
        let mut s: Vec<(Box<dyn crate::pipe::Transform>, String)> = vec![
            (Box::new(Exposure), "exposure".into()),
            (Box::new(Contrast), "contrast".into()),
            (Box::new(ToneCurve), "tonecurve".into()),
            (Box::new(LightnessMask), "lightnessmask".into()),
            (Box::new(Saturation), "saturation".into()),
        ];
        for i in 0..COLOR_EDITOR_COUNT {
            s.push((Box::new(ColorEditor), format!("colorEditor{}", i)));
        }
        s.push((Box::new(Geometry), "geometry".into()));
        s
    };
    for (transform, name) in stages {
        let params = transform.default_params();
        pipe.append(transform, params, name)
            .expect("default chain is well-formed");
    }
}
