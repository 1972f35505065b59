use chart_plots::core::{
    Accessor, Dataset, Extent, ExtentFilter, compute_stack_extent, compute_stack_offsets, field,
};

#[derive(Debug, Clone, Copy)]
struct Row {
    key: &'static str,
    value: f64,
}

fn row(key: &'static str, value: f64) -> Row {
    Row { key, value }
}

fn key_accessor() -> Accessor<Row> {
    field(|r: &Row| r.key)
}

fn value_accessor() -> Accessor<Row> {
    field(|r: &Row| r.value)
}

#[test]
fn stack_offsets_follow_input_order() {
    let a = Dataset::new(vec![row("k", 2.0)]);
    let b = Dataset::new(vec![row("k", 3.0)]);

    let forward = compute_stack_offsets([&a, &b], &key_accessor(), &value_accessor());
    assert_eq!(forward.get(a.id(), "k").expect("a entry").offset, 0.0);
    assert_eq!(forward.get(b.id(), "k").expect("b entry").offset, 2.0);

    let reversed = compute_stack_offsets([&b, &a], &key_accessor(), &value_accessor());
    assert_eq!(reversed.get(b.id(), "k").expect("b entry").offset, 0.0);
    assert_eq!(reversed.get(a.id(), "k").expect("a entry").offset, 3.0);
}

#[test]
fn single_positive_value_extent_spans_zero_to_value() {
    let a = Dataset::new(vec![row("k", 4.5)]);
    let offsets = compute_stack_offsets([&a], &key_accessor(), &value_accessor());

    let extent = compute_stack_extent(&offsets, [&a], &ExtentFilter::all());
    assert_eq!(extent, Some(Extent::new(0.0, 4.5)));
}

#[test]
fn two_datasets_at_one_key_stack_to_their_sum() {
    let a = Dataset::new(vec![row("k", 3.0)]);
    let b = Dataset::new(vec![row("k", 5.0)]);
    let offsets = compute_stack_offsets([&a, &b], &key_accessor(), &value_accessor());

    let extent = compute_stack_extent(&offsets, [&a, &b], &ExtentFilter::all());
    assert_eq!(extent, Some(Extent::new(0.0, 8.0)));
}

#[test]
fn empty_input_yields_empty_offsets_and_no_extent() {
    let datasets: Vec<Dataset<Row>> = Vec::new();
    let offsets = compute_stack_offsets(&datasets, &key_accessor(), &value_accessor());
    assert!(offsets.is_empty());
    assert_eq!(offsets.len(), 0);

    let extent = compute_stack_extent(&offsets, &datasets, &ExtentFilter::all());
    assert_eq!(extent, None);
}

#[test]
fn empty_dataset_gets_an_empty_entry_map() {
    let empty: Dataset<Row> = Dataset::default();
    let offsets = compute_stack_offsets([&empty], &key_accessor(), &value_accessor());

    assert_eq!(offsets.len(), 1);
    assert!(offsets.dataset(empty.id()).expect("dataset entry").is_empty());
    assert_eq!(
        compute_stack_extent(&offsets, [&empty], &ExtentFilter::all()),
        None
    );
}

#[test]
fn mixed_signs_at_one_key_use_separate_ladders() {
    let a = Dataset::new(vec![row("x", 2.0), row("y", 3.0), row("z", -4.0)]);
    let b = Dataset::new(vec![row("x", 5.0), row("y", 1.0), row("z", 6.0)]);
    let offsets = compute_stack_offsets([&a, &b], &key_accessor(), &value_accessor());

    let negative = offsets.get(a.id(), "z").expect("negative entry");
    let positive = offsets.get(b.id(), "z").expect("positive entry");
    assert_eq!((negative.offset, negative.end()), (0.0, -4.0));
    assert_eq!((positive.offset, positive.end()), (0.0, 6.0));
    assert!(negative.offset.max(negative.end()) <= positive.offset.min(positive.end()));

    let extent = compute_stack_extent(&offsets, [&a, &b], &ExtentFilter::all());
    assert_eq!(extent, Some(Extent::new(-4.0, 7.0)));
}

#[test]
fn negative_values_stack_downward() {
    let a = Dataset::new(vec![row("k", -1.0)]);
    let b = Dataset::new(vec![row("k", -2.5)]);
    let c = Dataset::new(vec![row("k", 4.0)]);
    let offsets = compute_stack_offsets([&a, &b, &c], &key_accessor(), &value_accessor());

    assert_eq!(offsets.get(a.id(), "k").expect("a").offset, 0.0);
    assert_eq!(offsets.get(b.id(), "k").expect("b").offset, -1.0);
    assert_eq!(offsets.get(c.id(), "k").expect("c").offset, 0.0);
    assert_eq!(
        compute_stack_extent(&offsets, [&a, &b, &c], &ExtentFilter::all()),
        Some(Extent::new(-3.5, 4.0))
    );
}

#[test]
fn sparse_keys_leave_running_totals_untouched() {
    let a = Dataset::new(vec![row("a", 1.0)]);
    let b = Dataset::new(vec![row("b", 2.0)]);
    let c = Dataset::new(vec![row("a", 3.0), row("b", 4.0)]);
    let offsets = compute_stack_offsets([&a, &b, &c], &key_accessor(), &value_accessor());

    assert!(offsets.get(b.id(), "a").is_none());
    assert!(offsets.get(a.id(), "b").is_none());
    assert_eq!(offsets.get(c.id(), "a").expect("c at a").offset, 1.0);
    assert_eq!(offsets.get(c.id(), "b").expect("c at b").offset, 2.0);
}

#[test]
fn repeated_key_within_a_dataset_accumulates_and_keeps_last_entry() {
    let a = Dataset::new(vec![row("k", 1.0), row("k", 2.0)]);
    let b = Dataset::new(vec![row("k", 4.0)]);
    let offsets = compute_stack_offsets([&a, &b], &key_accessor(), &value_accessor());

    let last = offsets.get(a.id(), "k").expect("a entry");
    assert_eq!((last.offset, last.value, last.index), (1.0, 2.0, 1));
    assert_eq!(offsets.get(b.id(), "k").expect("b entry").offset, 3.0);
}

#[test]
fn entries_keep_record_processing_order() {
    let a = Dataset::new(vec![row("c", 1.0), row("a", 1.0), row("b", 1.0)]);
    let offsets = compute_stack_offsets([&a], &key_accessor(), &value_accessor());

    let keys: Vec<&str> = offsets
        .dataset(a.id())
        .expect("entries")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["c", "a", "b"]);
}

#[test]
fn nan_values_propagate_unless_filtered() {
    let a = Dataset::new(vec![row("a", 1.0), row("b", f64::NAN)]);
    let offsets = compute_stack_offsets([&a], &key_accessor(), &value_accessor());

    let unfiltered = compute_stack_extent(&offsets, [&a], &ExtentFilter::all()).expect("extent");
    assert!(unfiltered.min.is_nan());
    assert!(unfiltered.max.is_nan());

    let finite = ExtentFilter::finite(value_accessor());
    assert_eq!(
        compute_stack_extent(&offsets, [&a], &finite),
        Some(Extent::new(0.0, 1.0))
    );
}

#[test]
fn filter_rejecting_everything_yields_no_extent() {
    let a = Dataset::new(vec![row("a", 1.0), row("b", 2.0)]);
    let offsets = compute_stack_offsets([&a], &key_accessor(), &value_accessor());

    let none = ExtentFilter::new(|_: &Row, _, _| false);
    assert_eq!(compute_stack_extent(&offsets, [&a], &none), None);
}

#[test]
fn numeric_and_text_keys_group_by_canonical_form() {
    let numbers = Dataset::new(vec![1.0_f64, 2.0]);
    let more = Dataset::new(vec![1.0_f64]);
    let key: Accessor<f64> = field(|v: &f64| *v);
    let value: Accessor<f64> = field(|_: &f64| 10.0);
    let offsets = compute_stack_offsets([&numbers, &more], &key, &value);

    assert_eq!(offsets.get(more.id(), "1").expect("key 1").offset, 10.0);
    assert!(offsets.get(more.id(), "1.0").is_none());
}
