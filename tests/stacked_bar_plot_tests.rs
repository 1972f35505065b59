use std::rc::Rc;

use approx::assert_relative_eq;
use chart_plots::ChartError;
use chart_plots::api::{AnimatorRole, AnimatorSpec, AttrToProjector, StackedBarPlot};
use chart_plots::core::{
    CategoryScale, Dataset, DatasetId, Extent, ExtentFilter, LinearScale, Orientation, Property,
    Value, constant, field,
};

#[derive(Debug, Clone, Copy)]
struct Row {
    key: &'static str,
    value: f64,
}

fn row(key: &'static str, value: f64) -> Row {
    Row { key, value }
}

fn project(
    plot: &StackedBarPlot<Row>,
    attrs: &AttrToProjector<Row>,
    attr: &str,
    dataset: DatasetId,
    index: usize,
) -> Value {
    let dataset = plot.plot().dataset(dataset).expect("dataset");
    let projector = attrs.get(attr).expect("projector");
    projector(&dataset.data()[index], index, dataset).expect("projection")
}

fn number(value: Value) -> f64 {
    match value {
        Value::Number(number) => number,
        other => panic!("expected a number, got {other:?}"),
    }
}

/// Vertical bars over categories `a`/`b` on a 200px wide band axis and a
/// 0..10 value axis drawn top-down over 100px.
fn vertical_plot() -> (StackedBarPlot<Row>, DatasetId, DatasetId) {
    let mut plot = StackedBarPlot::new(Orientation::Vertical);
    let categories = CategoryScale::new(["a", "b"], 0.0, 200.0).expect("category scale");
    let values = LinearScale::with_range(0.0, 10.0, 100.0, 0.0).expect("value scale");
    let inner = plot.plot_mut();
    inner.set_x_with_scale(field(|r: &Row| r.key), Rc::new(categories));
    inner.set_y_with_scale(field(|r: &Row| r.value), Rc::new(values));
    let first = inner.add_dataset(Dataset::new(vec![row("a", 3.0), row("b", -2.0)]));
    let second = inner.add_dataset(Dataset::new(vec![row("a", 5.0)]));
    (plot, first, second)
}

#[test]
fn stacked_extent_covers_both_ladders() {
    let (mut plot, _, _) = vertical_plot();
    assert_eq!(plot.stacked_extent(), Some(Extent::new(-2.0, 8.0)));
    assert_eq!(plot.extent(Property::Y), Some(Extent::new(-2.0, 8.0)));
}

#[test]
fn key_axis_extent_ignores_stacking() {
    let mut plot = StackedBarPlot::new(Orientation::Vertical);
    let inner = plot.plot_mut();
    inner.set_x(field(|r: &(f64, f64)| r.0));
    inner.set_y(field(|r: &(f64, f64)| r.1));
    inner.add_dataset(Dataset::new(vec![(1.0, 3.0), (4.0, 5.0)]));
    inner.add_dataset(Dataset::new(vec![(4.0, 2.0)]));

    assert_eq!(plot.extent(Property::X), Some(Extent::new(1.0, 4.0)));
    assert_eq!(plot.extent(Property::Y), Some(Extent::new(0.0, 7.0)));
}

#[test]
fn vertical_bars_project_stacked_positions() {
    let (mut plot, first, second) = vertical_plot();
    let attrs = plot.attr_to_projector().expect("projectors");

    // Second dataset sits on top of the first at `a`: 3..8.
    assert_relative_eq!(number(project(&plot, &attrs, "y", second, 0)), 20.0, epsilon = 1e-9);
    assert_relative_eq!(number(project(&plot, &attrs, "height", second, 0)), 50.0, epsilon = 1e-9);

    // Negative bars hang from zero.
    assert_relative_eq!(number(project(&plot, &attrs, "y", first, 1)), 100.0, epsilon = 1e-9);
    assert_relative_eq!(number(project(&plot, &attrs, "height", first, 1)), 20.0, epsilon = 1e-9);

    // Band centered at 50 with 30% inner padding.
    assert_relative_eq!(number(project(&plot, &attrs, "x", first, 0)), 15.0, epsilon = 1e-9);
    assert_relative_eq!(number(project(&plot, &attrs, "width", first, 0)), 70.0, epsilon = 1e-9);
}

#[test]
fn horizontal_bars_swap_attributes_and_start_at_left_edge() {
    let mut plot = StackedBarPlot::new(Orientation::Horizontal);
    let values = LinearScale::with_range(-10.0, 10.0, 0.0, 200.0).expect("value scale");
    let inner = plot.plot_mut();
    inner.set_x_with_scale(field(|r: &Row| r.value), Rc::new(values));
    inner.set_y(field(|r: &Row| r.key));
    let id = inner.add_dataset(Dataset::new(vec![row("a", 3.0), row("b", -2.0)]));

    let attrs = plot.attr_to_projector().expect("projectors");
    for attr in ["x", "width", "y", "height"] {
        assert!(attrs.contains_key(attr), "missing {attr}");
    }

    // 0 maps to 100px, 3 to 130px: the bar spans 100..130.
    assert_relative_eq!(number(project(&plot, &attrs, "x", id, 0)), 100.0, epsilon = 1e-9);
    assert_relative_eq!(number(project(&plot, &attrs, "width", id, 0)), 30.0, epsilon = 1e-9);
    // -2 maps to 80px: the bar spans 80..100.
    assert_relative_eq!(number(project(&plot, &attrs, "x", id, 1)), 80.0, epsilon = 1e-9);
    assert_relative_eq!(number(project(&plot, &attrs, "width", id, 1)), 20.0, epsilon = 1e-9);
}

#[test]
fn key_scale_without_bands_uses_default_thickness() {
    let mut plot = StackedBarPlot::new(Orientation::Vertical);
    let keys = LinearScale::with_range(0.0, 10.0, 0.0, 100.0).expect("key scale");
    let inner = plot.plot_mut();
    inner.set_x_with_scale(field(|r: &(f64, f64)| r.0), Rc::new(keys));
    inner.set_y(field(|r: &(f64, f64)| r.1));
    let id = inner.add_dataset(Dataset::new(vec![(5.0, 1.0)]));

    let attrs = plot.attr_to_projector().expect("projectors");
    let dataset = plot.plot().dataset(id).expect("dataset");
    let datum = &dataset.data()[0];
    assert_eq!(
        attrs["width"](datum, 0, dataset).expect("width"),
        Value::Number(10.0)
    );
    assert_eq!(
        attrs["x"](datum, 0, dataset).expect("x"),
        Value::Number(45.0)
    );
}

#[test]
fn stale_projector_reports_missing_stack_entry() {
    let (mut plot, first, _) = vertical_plot();
    let attrs = plot.attr_to_projector().expect("projectors");

    plot.plot_mut()
        .replace_data(first, vec![row("c", 1.0)])
        .expect("known dataset");

    let dataset = plot.plot().dataset(first).expect("dataset");
    let err = attrs["y"](&dataset.data()[0], 0, dataset).expect_err("stale offsets");
    match err {
        ChartError::MissingStackEntry { dataset, key } => {
            assert_eq!(dataset, first);
            assert_eq!(key, "c");
        }
        other => panic!("unexpected error: {other}"),
    }

    // A fresh projector map sees the new key.
    let attrs = plot.attr_to_projector().expect("projectors");
    assert_relative_eq!(number(project(&plot, &attrs, "y", first, 0)), 90.0, epsilon = 1e-9);
}

#[test]
fn projection_requires_both_bindings() {
    let mut plot: StackedBarPlot<Row> = StackedBarPlot::new(Orientation::Vertical);
    plot.plot_mut().set_x(field(|r: &Row| r.key));

    let err = plot.attr_to_projector().err().expect("y is unbound");
    assert!(matches!(
        err,
        ChartError::MissingBinding {
            property: Property::Y
        }
    ));
    assert!(plot.stack_offsets().is_empty());
    assert_eq!(plot.stacked_extent(), None);
}

#[test]
fn cosmetic_changes_keep_cached_offsets() {
    let (mut plot, _, _) = vertical_plot();
    let before = plot.stack_offsets();

    plot.plot_mut().set_attr("fill", constant("steelblue"));
    plot.plot_mut().set_animated(true);
    assert!(Rc::ptr_eq(&before, &plot.stack_offsets()));

    plot.plot_mut().add_dataset(Dataset::new(vec![row("b", 1.0)]));
    let after = plot.stack_offsets();
    assert!(!Rc::ptr_eq(&before, &after));
    assert_eq!(after.len(), 3);
}

#[test]
fn dataset_added_after_a_read_reaches_the_next_extent() {
    let mut plot = StackedBarPlot::new(Orientation::Vertical);
    let inner = plot.plot_mut();
    inner.set_x(field(|r: &Row| r.key));
    inner.set_y(field(|r: &Row| r.value));
    inner.add_dataset(Dataset::new(vec![row("a", 3.0)]));
    assert_eq!(plot.stacked_extent(), Some(Extent::new(0.0, 3.0)));

    let inner = plot.plot_mut();
    inner.add_dataset(Dataset::new(vec![row("a", 5.0)]));
    assert!(!inner.pending().is_none());
    assert_eq!(plot.stacked_extent(), Some(Extent::new(0.0, 8.0)));
    assert!(plot.plot().pending().is_none());
}

#[test]
fn user_filter_narrows_stacked_extent() {
    let (mut plot, _, _) = vertical_plot();
    plot.plot_mut()
        .set_extent_filter(Property::Y, ExtentFilter::new(|r: &Row, _, _| r.key != "b"));
    assert_eq!(plot.stacked_extent(), Some(Extent::new(0.0, 8.0)));
}

#[test]
fn bound_attributes_pass_through_or_scale() {
    let (mut plot, first, _) = vertical_plot();
    let opacity = LinearScale::with_range(0.0, 10.0, 0.0, 1.0).expect("opacity scale");
    plot.plot_mut().set_attr("fill", constant("steelblue"));
    plot.plot_mut()
        .set_attr_with_scale("opacity", field(|r: &Row| r.value), Rc::new(opacity));

    let attrs = plot.attr_to_projector().expect("projectors");
    assert_eq!(
        project(&plot, &attrs, "fill", first, 0),
        Value::Text("steelblue".to_owned())
    );
    assert_relative_eq!(number(project(&plot, &attrs, "opacity", first, 0)), 0.3, epsilon = 1e-9);
}

#[test]
fn animated_plot_draws_collapsed_reset_step_first() {
    let (mut plot, first, _) = vertical_plot();
    assert_eq!(plot.draw_steps().expect("steps").len(), 1);

    plot.plot_mut().set_animated(true);
    let steps = plot.draw_steps().expect("steps");
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].role, AnimatorRole::Reset);
    assert_eq!(steps[0].animator, AnimatorSpec::Null);
    assert_eq!(steps[1].role, AnimatorRole::Main);

    let reset = &steps[0].attr_to_projector;
    assert_eq!(project(&plot, reset, "y", first, 0), Value::Number(100.0));
    assert_eq!(project(&plot, reset, "height", first, 0), Value::Number(0.0));
    assert_relative_eq!(number(project(&plot, reset, "x", first, 0)), 15.0, epsilon = 1e-9);
}

#[test]
fn stack_snapshot_is_keyed_by_dataset_and_key() {
    let (mut plot, first, second) = vertical_plot();
    let json = plot.stack_snapshot_json_pretty().expect("snapshot");
    let snapshot: serde_json::Value = serde_json::from_str(&json).expect("valid json");

    let second_a = &snapshot["datasets"][second.get().to_string()]["a"];
    assert_eq!(second_a["offset"], 3.0);
    assert_eq!(second_a["value"], 5.0);
    assert_eq!(
        snapshot["datasets"][first.get().to_string()]["b"]["offset"],
        0.0
    );
}

#[test]
fn orientation_change_restacks_on_the_other_axis() {
    let mut plot = StackedBarPlot::new(Orientation::Vertical);
    let inner = plot.plot_mut();
    inner.set_x(field(|r: &(f64, f64)| r.0));
    inner.set_y(field(|r: &(f64, f64)| r.1));
    inner.add_dataset(Dataset::new(vec![(1.0, 2.0)]));
    inner.add_dataset(Dataset::new(vec![(3.0, 2.0)]));
    assert_eq!(plot.stacked_extent(), Some(Extent::new(0.0, 2.0)));

    plot.set_orientation(Orientation::Horizontal);
    assert_eq!(plot.orientation(), Orientation::Horizontal);
    // Keys are now the y values, which coincide, so x values stack.
    assert_eq!(plot.stacked_extent(), Some(Extent::new(0.0, 4.0)));
    assert_eq!(plot.extent(Property::Y), Some(Extent::new(2.0, 2.0)));
}
