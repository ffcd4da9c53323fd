//! Pre-check of an extracted submission directory.
//!
//! Every problem is collected as a human-readable message; nothing here
//! aborts on the first failure.
use crate::algorithms::store::{disp_map_path, runtime_path};
use crate::config::{DIR_NAME_DISP_MAPS, DIR_NAME_RUNTIMES};
use crate::error::EvalError;
use crate::image::{io, pfm};
use log::info;
use serde::Serialize;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub success: bool,
    pub messages: Vec<String>,
}

/// Check that `submission_dir` holds a `width × height` disparity map and a
/// parsable runtime for every scene in `scene_names`.
pub fn validate_extracted_submission<S: AsRef<str>>(
    submission_dir: &Path,
    scene_names: &[S],
    width: usize,
    height: usize,
) -> ValidationReport {
    info!("Validating extracted submission: {}.", submission_dir.display());
    let mut errors = Vec::new();

    if !submission_dir.join(DIR_NAME_DISP_MAPS).is_dir() {
        errors.push(format!(
            "Could not find disparity map directory: \"{DIR_NAME_DISP_MAPS}\"."
        ));
    } else {
        info!("Validating disparity map files.");
        for name in scene_names {
            let name = name.as_ref();
            let path = disp_map_path(submission_dir, name);
            let relative = format!("{DIR_NAME_DISP_MAPS}/{name}.pfm");
            if !path.is_file() {
                errors.push(format!(
                    "Frame {name}: Could not find disparity file: \"{relative}\"."
                ));
                continue;
            }
            match pfm::read_pfm(&path) {
                Ok(disp) if disp.shape() != (height, width) => errors.push(format!(
                    "Frame {name}, File {relative}: Resolution mismatch. \
                     Expected ({height}, {width}), got ({}, {}).",
                    disp.h, disp.w
                )),
                Ok(_) => {}
                Err(EvalError::Pfm { source, .. }) => errors.push(format!(
                    "Frame {name}, File {relative}, PFM Error: {source}."
                )),
                Err(err) => errors.push(format!("Frame {name}, File {relative}, Error: {err}.")),
            }
        }
    }

    if !submission_dir.join(DIR_NAME_RUNTIMES).is_dir() {
        errors.push(format!(
            "Could not find runtimes directory: \"{DIR_NAME_RUNTIMES}\"."
        ));
    } else {
        info!("Validating runtime files.");
        for name in scene_names {
            let name = name.as_ref();
            let path = runtime_path(submission_dir, name);
            let relative = format!("{DIR_NAME_RUNTIMES}/{name}.txt");
            if !path.is_file() {
                errors.push(format!(
                    "Frame {name}: Could not find runtime file: \"{relative}\"."
                ));
                continue;
            }
            if let Err(err) = io::read_runtime(&path) {
                errors.push(format!("Frame {name}, File {relative}, Error: {err}."));
            }
        }
    }

    let success = errors.is_empty();
    if success {
        info!("Validated submission successfully.");
    }
    ValidationReport {
        success,
        messages: errors,
    }
}
