use serde::{Deserialize, Serialize};
use crate::bucket::Histogram;

pub const DATASET_LABEL: &str = "Twitter Data";
const BORDER_COLOR: &str = "rgb(75, 192, 192)";
const BACKGROUND_COLOR: &str = "rgb(54, 162, 235)";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<u64>,
    pub border_color: String,
    pub background_color: String,
    pub fill: bool,
}

impl ChartDataset {
    pub fn bars(data: Vec<u64>) -> Self {
        Self {
            label: DATASET_LABEL.to_string(),
            data,
            border_color: BORDER_COLOR.to_string(),
            background_color: BACKGROUND_COLOR.to_string(),
            fill: false,
        }
    }
}

pub trait ChartSink {
    fn set_dataset(&mut self, dataset: ChartDataset);
    fn set_labels(&mut self, labels: Vec<String>);
    fn redraw(&mut self);
}

pub fn render<C: ChartSink + ?Sized>(chart: &mut C, histogram: &Histogram) {
    chart.set_dataset(ChartDataset::bars(histogram.series.counts().to_vec()));
    chart.set_labels(histogram.labels.clone());
    chart.redraw();
}

// Chart config served to the browser widget
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct ChartConfig {
    pub datasets: Vec<ChartDataset>,
    pub labels: Vec<String>,
}

// In-process chart: staged edits become visible on `redraw`.
#[derive(Debug, Default)]
pub struct ChartState {
    pending: ChartConfig,
    shown: ChartConfig,
    revision: u64,
}

// Snapshot of what the chart currently shows
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChartSnapshot {
    pub revision: u64,
    pub data: ChartConfig,
}

impl ChartState {
    pub fn snapshot(&self) -> ChartSnapshot {
        ChartSnapshot {
            revision: self.revision,
            data: self.shown.clone(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl ChartSink for ChartState {
    // One dataset per chart, a new one replaces the old
    fn set_dataset(&mut self, dataset: ChartDataset) {
        self.pending.datasets = vec![dataset];
    }

    fn set_labels(&mut self, labels: Vec<String>) {
        self.pending.labels = labels;
    }

    fn redraw(&mut self) {
        self.shown = self.pending.clone();
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::bucketize;
    use crate::window::TimeWindow;
    use chrono::TimeDelta;

    fn histogram() -> Histogram {
        let window = TimeWindow::from_api_dates("201906171800", "201906171900").unwrap();
        bucketize(&[], &window, TimeDelta::minutes(20)).unwrap()
    }

    #[test]
    fn test_render_updates_chart() {
        let mut chart = ChartState::default();
        render(&mut chart, &histogram());

        let snapshot = chart.snapshot();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.data.labels, vec!["0-20 min", "20-40 min", "40-60 min"]);
        assert_eq!(snapshot.data.datasets, vec![ChartDataset::bars(vec![0, 0, 0])]);
    }

    #[test]
    fn test_edits_hidden_until_redraw() {
        let mut chart = ChartState::default();
        chart.set_labels(vec!["0-20 min".to_string()]);

        assert!(chart.snapshot().data.labels.is_empty());
        assert_eq!(chart.revision(), 0);
    }

    #[test]
    fn test_rerender_replaces_dataset() {
        let mut chart = ChartState::default();
        render(&mut chart, &histogram());
        render(&mut chart, &histogram());

        let snapshot = chart.snapshot();
        assert_eq!(snapshot.revision, 2);
        assert_eq!(snapshot.data.datasets.len(), 1);
    }

    #[test]
    fn test_dataset_serializes_camel_case() {
        let json = serde_json::to_value(ChartDataset::bars(vec![1])).unwrap();
        assert_eq!(json["borderColor"], "rgb(75, 192, 192)");
        assert_eq!(json["backgroundColor"], "rgb(54, 162, 235)");
        assert_eq!(json["label"], "Twitter Data");
        assert_eq!(json["fill"], false);
    }
}
