// src/data_input/survey_record.rs

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};

/// Display flags carried by a record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordFlags {
    /// Elevation-referenced display requested (requires `SurveyRecord::elevation`).
    #[serde(default)]
    pub elev: bool,
}

/// Tracked horizons: one power row per pick number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Picks {
    pub picknums: Vec<i64>,
    /// Shape (picknums.len(), tnum); row `i` belongs to `picknums[i]`.
    pub power: Array2<f64>,
}

impl Picks {
    pub fn is_empty(&self) -> bool {
        self.picknums.is_empty()
    }

    /// Power row for a pick number, if the pick exists.
    pub fn power_for(&self, picknum: i64) -> Option<ArrayView1<'_, f64>> {
        self.picknums
            .iter()
            .position(|&p| p == picknum)
            .map(|row| self.power.row(row))
    }
}

/// A processed radar transect as produced by an ingestion adapter.
///
/// `data` is laid out (samples, traces). The renderers only ever read a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub data: Array2<f64>,
    pub tnum: usize,
    pub travel_time: Array1<f64>, // Two-way travel time per sample (usec).
    pub dist: Array1<f64>,        // Cumulative along-track distance per trace (km).
    #[serde(default)]
    pub nmo_depth: Option<Array1<f64>>,
    #[serde(default)]
    pub elevation: Option<Array1<f64>>,
    #[serde(default)]
    pub flags: RecordFlags,
    pub lat: Array1<f64>,
    pub long: Array1<f64>,
    #[serde(default)]
    pub picks: Option<Picks>,
}

impl SurveyRecord {
    /// Builds a record without geolocation, depth correction, elevation or picks.
    /// Latitude and longitude are zero-filled so the record stays consistent.
    pub fn new(data: Array2<f64>, travel_time: Array1<f64>, dist: Array1<f64>) -> Self {
        let tnum = data.ncols();
        SurveyRecord {
            data,
            tnum,
            travel_time,
            dist,
            nmo_depth: None,
            elevation: None,
            flags: RecordFlags::default(),
            lat: Array1::zeros(tnum),
            long: Array1::zeros(tnum),
            picks: None,
        }
    }

    pub fn with_nmo_depth(mut self, nmo_depth: Array1<f64>) -> Self {
        self.nmo_depth = Some(nmo_depth);
        self
    }

    /// Attaches elevations and switches the record to elevation-referenced display.
    pub fn with_elevation(mut self, elevation: Array1<f64>) -> Self {
        self.elevation = Some(elevation);
        self.flags.elev = true;
        self
    }

    pub fn with_location(mut self, lat: Array1<f64>, long: Array1<f64>) -> Self {
        self.lat = lat;
        self.long = long;
        self
    }

    pub fn with_picks(mut self, picks: Picks) -> Self {
        self.picks = Some(picks);
        self
    }

    pub fn num_samples(&self) -> usize {
        self.data.nrows()
    }

    /// Elevation values when elevation-referenced display is both requested and possible.
    pub fn elevation_display(&self) -> Option<&Array1<f64>> {
        if self.flags.elev {
            self.elevation.as_ref()
        } else {
            None
        }
    }

    /// Checks the shape invariants every renderer relies on.
    pub fn validate(&self) -> Result<()> {
        let (nsamples, ntraces) = self.data.dim();
        if ntraces != self.tnum {
            return Err(PlotError::InvalidRecord(format!(
                "data has {ntraces} traces but tnum is {}",
                self.tnum
            )));
        }
        if self.travel_time.len() != nsamples {
            return Err(PlotError::InvalidRecord(format!(
                "travel_time has {} entries, expected {nsamples}",
                self.travel_time.len()
            )));
        }
        for (name, len) in [
            ("dist", self.dist.len()),
            ("lat", self.lat.len()),
            ("long", self.long.len()),
        ] {
            if len != self.tnum {
                return Err(PlotError::InvalidRecord(format!(
                    "{name} has {len} entries, expected {}",
                    self.tnum
                )));
            }
        }
        if let Some(depth) = &self.nmo_depth {
            if depth.len() != nsamples {
                return Err(PlotError::InvalidRecord(format!(
                    "nmo_depth has {} entries, expected {nsamples}",
                    depth.len()
                )));
            }
        }
        if self.flags.elev {
            match &self.elevation {
                Some(elev) if !elev.is_empty() => {}
                _ => {
                    return Err(PlotError::InvalidRecord(
                        "elevation display requested but no elevation values present".to_string(),
                    ))
                }
            }
        }
        if let Some(picks) = &self.picks {
            let mut seen = std::collections::HashSet::new();
            if let Some(dup) = picks.picknums.iter().find(|p| !seen.insert(**p)) {
                return Err(PlotError::InvalidRecord(format!(
                    "pick number {dup} appears more than once"
                )));
            }
            if picks.power.dim() != (picks.picknums.len(), self.tnum) {
                return Err(PlotError::InvalidRecord(format!(
                    "pick power has shape {:?}, expected ({}, {})",
                    picks.power.dim(),
                    picks.picknums.len(),
                    self.tnum
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array};

    fn small_record() -> SurveyRecord {
        let data = Array::from_shape_fn((4, 3), |(i, j)| (i * 3 + j) as f64);
        SurveyRecord::new(data, array![0.0, 0.1, 0.2, 0.3], array![0.0, 0.5, 1.0])
    }

    #[test]
    fn test_new_record_is_consistent() {
        let rec = small_record();
        assert_eq!(rec.tnum, 3);
        assert_eq!(rec.num_samples(), 4);
        assert!(rec.validate().is_ok());
        assert!(rec.elevation_display().is_none());
    }

    #[test]
    fn test_validate_rejects_mismatched_travel_time() {
        let mut rec = small_record();
        rec.travel_time = array![0.0, 0.1];
        assert!(matches!(rec.validate(), Err(PlotError::InvalidRecord(_))));
    }

    #[test]
    fn test_validate_rejects_elev_flag_without_elevation() {
        let mut rec = small_record();
        rec.flags.elev = true;
        assert!(matches!(rec.validate(), Err(PlotError::InvalidRecord(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_picks() {
        let rec = small_record().with_picks(Picks {
            picknums: vec![1, 1],
            power: Array2::ones((2, 3)),
        });
        assert!(matches!(rec.validate(), Err(PlotError::InvalidRecord(_))));
    }

    #[test]
    fn test_power_for_looks_up_by_pick_number() {
        let picks = Picks {
            picknums: vec![7, 2],
            power: array![[1.0, 1.0, 1.0], [5.0, 6.0, 7.0]],
        };
        assert_eq!(picks.power_for(2).unwrap().to_vec(), vec![5.0, 6.0, 7.0]);
        assert!(picks.power_for(3).is_none());
    }

    #[test]
    fn test_record_json_round_trip_keeps_optional_fields() {
        let rec = small_record().with_nmo_depth(array![0.0, 1.0, 2.0, 3.0]);
        let text = serde_json::to_string(&rec).unwrap();
        let back: SurveyRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, rec);
    }
}

// src/data_input/survey_record.rs
