//! Vega-Lite v5 chart specifications.
//!
//! Every chart carries an interval selection bound to its scales, so it can be
//! panned and zoomed in the browser.

use crate::model::{ContributorActivity, LanguageShare, TimeWindow};
use serde_json::{json, Map, Value};

const SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";
const WIDTH: u32 = 320;
const HEIGHT: u32 = 280;

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub spec: Value,
}

impl Chart {
    fn new(values: Value, mut body: Value) -> Self {
        let mut spec = json!({
            "$schema": SCHEMA,
            "width": WIDTH,
            "height": HEIGHT,
            "data": { "values": values },
        });
        if let (Some(spec_obj), Some(body_obj)) = (spec.as_object_mut(), body.as_object_mut()) {
            spec_obj.append(body_obj);
        }
        Self { spec }
    }

    pub fn to_json(&self) -> String {
        self.spec.to_string()
    }
}

fn pan_zoom() -> Value {
    json!([{ "name": "grid", "select": "interval", "bind": "scales" }])
}

/// Horizontal bars, longest first.
pub fn bar_chart(rows: &[(String, f64)], category: &str, value: &str) -> Chart {
    let values: Vec<Value> = rows
        .iter()
        .map(|(c, v)| {
            let mut row = Map::new();
            row.insert(category.to_string(), json!(c));
            row.insert(value.to_string(), json!(v));
            Value::Object(row)
        })
        .collect();
    Chart::new(
        json!(values),
        json!({
            "params": pan_zoom(),
            "mark": "bar",
            "encoding": {
                "x": { "field": value, "type": "quantitative" },
                "y": { "field": category, "type": "ordinal", "sort": "-x" },
                "tooltip": [
                    { "field": category, "type": "nominal" },
                    { "field": value, "type": "quantitative" }
                ]
            }
        }),
    )
}

pub fn donut_chart(shares: &[LanguageShare]) -> Chart {
    let values: Vec<Value> = shares
        .iter()
        .map(|s| json!({ "language": s.language, "pct": s.fraction }))
        .collect();
    Chart::new(
        json!(values),
        json!({
            "params": pan_zoom(),
            "mark": { "type": "arc", "innerRadius": 45 },
            "encoding": {
                "theta": { "field": "pct", "type": "quantitative" },
                "color": { "field": "language", "type": "nominal" },
                "tooltip": [
                    { "field": "language", "type": "nominal" },
                    { "field": "pct", "type": "quantitative", "format": ".2%" }
                ]
            }
        }),
    )
}

/// Radial chart of commit totals: angle and radius both scale with the total.
pub fn radial_chart(totals: &[(String, u64)]) -> Chart {
    let values: Vec<Value> = totals
        .iter()
        .map(|(author, total)| json!({ "author": author, "total": total }))
        .collect();
    Chart::new(
        json!(values),
        json!({
            "encoding": {
                "theta": { "field": "total", "type": "quantitative", "stack": true },
                "radius": {
                    "field": "total",
                    "type": "quantitative",
                    "scale": { "type": "sqrt", "zero": true, "rangeMin": 0 }
                },
                "color": { "field": "author", "type": "nominal" },
                "tooltip": [
                    { "field": "total", "type": "quantitative" },
                    { "field": "author", "type": "nominal" }
                ]
            },
            "layer": [
                {
                    "params": pan_zoom(),
                    "mark": { "type": "arc", "innerRadius": 20, "stroke": "#fff" }
                },
                {
                    "mark": { "type": "text", "radiusOffset": 10 },
                    "encoding": { "text": { "field": "total", "type": "quantitative" } }
                }
            ]
        }),
    )
}

/// Weekly commits per author; the x axis is pinned to `window` when given.
pub fn line_chart(activity: &[ContributorActivity], window: Option<&TimeWindow>) -> Chart {
    let values: Vec<Value> = activity
        .iter()
        .map(|row| {
            json!({
                "author": row.author,
                "total": row.total_commits,
                "week": row.week.timestamp_millis(),
                "commits": row.weekly_commits,
            })
        })
        .collect();

    let mut x = json!({ "field": "week", "type": "temporal" });
    if let Some(w) = window {
        x["scale"] = json!({ "domain": w.as_millis() });
    }

    Chart::new(
        json!(values),
        json!({
            "params": pan_zoom(),
            "mark": "line",
            "encoding": {
                "x": x,
                "y": { "field": "commits", "type": "quantitative" },
                "color": { "field": "author", "type": "nominal" },
                "tooltip": [
                    { "field": "week", "type": "temporal" },
                    { "field": "commits", "type": "quantitative" },
                    { "field": "total", "type": "quantitative" },
                    { "field": "author", "type": "nominal" }
                ]
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn bar_chart_uses_given_field_names() {
        let chart = bar_chart(&[("Rust".into(), 2.0)], "language", "code lines");
        assert_eq!(chart.spec["data"]["values"][0]["language"], "Rust");
        assert_eq!(chart.spec["data"]["values"][0]["code lines"], 2.0);
        assert_eq!(chart.spec["encoding"]["y"]["sort"], "-x");
        assert_eq!(chart.spec["$schema"], SCHEMA);
    }

    #[test]
    fn line_chart_pins_domain_to_window() {
        let start = Utc.with_ymd_and_hms(2020, 11, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2021, 12, 31, 0, 0, 0).unwrap();
        let window = TimeWindow::new(start, end).unwrap();
        let chart = line_chart(&[], Some(&window));
        assert_eq!(
            chart.spec["encoding"]["x"]["scale"]["domain"],
            json!([start.timestamp_millis(), end.timestamp_millis()])
        );
        assert!(line_chart(&[], None).spec["encoding"]["x"].get("scale").is_none());
    }

    #[test]
    fn radial_chart_layers_text_over_arcs() {
        let chart = radial_chart(&[("ana".into(), 5)]);
        assert_eq!(chart.spec["layer"][0]["mark"]["innerRadius"], 20);
        assert_eq!(chart.spec["layer"][1]["mark"]["type"], "text");
    }
}
