use log::{debug, info, warn};

use crate::error::{ReshapeWarning, Stage};

use super::ReshapeOutcome;

/// Receives progress notifications from a reshape run. Every method has a
/// no-op default.
pub trait ReshapeObserver {
    fn stage_started(&mut self, _stage: Stage) {}

    fn stage_completed(&mut self, _stage: Stage) {}

    fn warning(&mut self, _warning: &ReshapeWarning) {}

    fn finished(&mut self, _outcome: &ReshapeOutcome) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ReshapeObserver for NoopObserver {}

/// Forwards progress to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ReshapeObserver for LogObserver {
    fn stage_started(&mut self, stage: Stage) {
        match stage {
            Stage::Unpivot => info!("Transforming data (melt/unpivot)..."),
            Stage::Normalization => info!("Converting numeric columns and filling missing values..."),
            other => debug!("Starting {other}"),
        }
    }

    fn stage_completed(&mut self, stage: Stage) {
        debug!("Finished {stage}");
    }

    fn warning(&mut self, warning: &ReshapeWarning) {
        warn!("{warning}");
    }

    fn finished(&mut self, outcome: &ReshapeOutcome) {
        match outcome {
            ReshapeOutcome::Reshaped(table) => {
                info!("Transformation complete: {} parcel row(s)", table.row_count())
            }
            ReshapeOutcome::PassThrough(table) => info!(
                "No parcel groups reshaped; passing through {} fixed column(s)",
                table.columns().len()
            ),
            ReshapeOutcome::Empty => debug!("Reshape produced no output"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frame::InputTable, reshape::reshape_with_observer, schema::ParcelSchema};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ReshapeObserver for Recorder {
        fn stage_started(&mut self, stage: Stage) {
            self.events.push(format!("start {stage}"));
        }

        fn stage_completed(&mut self, stage: Stage) {
            self.events.push(format!("done {stage}"));
        }

        fn warning(&mut self, warning: &ReshapeWarning) {
            self.events.push(format!("warn {:?}", warning.stage()));
        }

        fn finished(&mut self, _outcome: &ReshapeOutcome) {
            self.events.push("finished".to_string());
        }
    }

    #[test]
    fn observer_sees_every_stage_in_order() {
        let input = InputTable::from_rows(["ID", "E_Tab_Opp_1"], [vec!["A", "1"]]);
        let mut recorder = Recorder::default();
        reshape_with_observer(
            &input,
            &["ID".to_string()],
            &ParcelSchema::default(),
            &mut recorder,
        );
        let mut expected = Vec::new();
        for stage in Stage::ALL {
            expected.push(format!("start {stage}"));
            expected.push(format!("done {stage}"));
        }
        expected.push("finished".to_string());
        assert_eq!(recorder.events, expected);
    }

    #[test]
    fn observer_hears_fallback_warnings() {
        let input = InputTable::from_rows(["Note"], [vec!["x"]]);
        let mut recorder = Recorder::default();
        let report = reshape_with_observer(
            &input,
            &["Missing".to_string()],
            &ParcelSchema::default(),
            &mut recorder,
        );
        assert_eq!(report.warnings.len(), 3);
        let warnings = recorder
            .events
            .iter()
            .filter(|e| e.starts_with("warn"))
            .count();
        assert_eq!(warnings, 3);
        assert_eq!(recorder.events.last().map(String::as_str), Some("finished"));
    }
}
