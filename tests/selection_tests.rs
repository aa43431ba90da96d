use datavis3d_rs::core::{
    AxisOrientation, BarDataProxy, ScatterDataProxy, SelectionFlags, Series, SeriesData,
    SeriesId,
};
use datavis3d_rs::render::{NullBackend, Selection, SelectionPosition};
use datavis3d_rs::{GraphConfig, GraphController, GraphError, GraphKind};
use glam::Vec3;

fn scatter_graph(points: Vec<Vec3>) -> (GraphController<NullBackend>, SeriesId) {
    let mut graph =
        GraphController::new(NullBackend::new(), GraphConfig::new(GraphKind::Scatter))
            .expect("engine init");
    let proxy = ScatterDataProxy::from_items(points).expect("finite points");
    let id = graph.create_series(Series::scatter(proxy));
    graph.add_series(id).expect("scatter series fits a scatter graph");
    graph.synchronize().expect("sync");
    (graph, id)
}

fn bar_graph(mode: SelectionFlags, rows: Vec<Vec<f32>>) -> (GraphController<NullBackend>, SeriesId) {
    let config = GraphConfig::new(GraphKind::Bars).with_selection_mode(mode);
    let mut graph = GraphController::new(NullBackend::new(), config).expect("engine init");
    let proxy = BarDataProxy::from_rows(rows).expect("finite rows");
    let id = graph.create_series(Series::bar(proxy));
    graph.add_series(id).expect("bar series fits a bar graph");
    graph.synchronize().expect("sync");
    (graph, id)
}

fn three_points() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 2.0, 1.0),
        Vec3::new(3.0, 4.0, 2.0),
    ]
}

#[test]
fn selection_is_published_on_the_next_pass() {
    let (mut graph, id) = scatter_graph(three_points());
    let position = SelectionPosition::Scatter { index: 2 };
    assert_eq!(graph.set_selected_item(id, position), Ok(true));
    assert!(graph.render_state().selection().is_none());

    graph.synchronize().expect("sync");
    assert_eq!(
        graph.render_state().selection(),
        Selection::Item {
            series: id,
            position
        }
    );
}

#[test]
fn shrinking_the_data_clears_a_stale_selection() {
    let (mut graph, id) = scatter_graph(three_points());
    graph
        .set_selected_item(id, SelectionPosition::Scatter { index: 2 })
        .expect("attached series");
    graph.synchronize().expect("sync");

    graph
        .series_mut(id)
        .and_then(Series::scatter_proxy_mut)
        .expect("scatter proxy")
        .remove_items(1, 2);
    let report = graph.synchronize().expect("sync");

    assert!(report.selection_cleared);
    assert!(graph.selection().is_none());
    assert!(graph.render_state().selection().is_none());
}

#[test]
fn items_outside_the_axis_window_are_not_selectable() {
    let (mut graph, id) = scatter_graph(three_points());
    graph
        .axis_mut(AxisOrientation::X)
        .expect("x axis")
        .set_range(0.0, 1.5);

    assert_eq!(
        graph.set_selected_item(id, SelectionPosition::Scatter { index: 2 }),
        Ok(false)
    );
    assert_eq!(
        graph.set_selected_item(id, SelectionPosition::Scatter { index: 1 }),
        Ok(true)
    );
    assert_eq!(
        graph.set_selected_item(id, SelectionPosition::Scatter { index: 9 }),
        Ok(false)
    );
    assert!(graph.selection().is_none());
}

#[test]
fn narrowing_the_window_drops_the_selection() {
    let (mut graph, id) = scatter_graph(three_points());
    graph
        .set_selected_item(id, SelectionPosition::Scatter { index: 2 })
        .expect("attached series");
    graph.synchronize().expect("sync");

    graph
        .axis_mut(AxisOrientation::Y)
        .expect("y axis")
        .set_max(3.0);
    let report = graph.synchronize().expect("sync");
    assert!(report.selection_cleared);
}

#[test]
fn scatter_selection_needs_item_mode() {
    let (mut graph, id) = scatter_graph(three_points());
    graph
        .set_selected_item(id, SelectionPosition::Scatter { index: 0 })
        .expect("attached series");
    graph.synchronize().expect("sync");

    graph.set_selection_mode(SelectionFlags::ROW);
    graph.synchronize().expect("sync");
    assert!(graph.render_state().selection().is_none());
    assert_eq!(
        graph.set_selected_item(id, SelectionPosition::Scatter { index: 0 }),
        Ok(false)
    );
}

#[test]
fn bar_rows_can_be_selected_in_row_mode() {
    let (mut graph, id) = bar_graph(SelectionFlags::ROW, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    assert_eq!(
        graph.set_selected_item(id, SelectionPosition::Bar { row: 1, column: 1 }),
        Ok(true)
    );
    assert_eq!(
        graph.set_selected_item(id, SelectionPosition::Bar { row: 2, column: 0 }),
        Ok(false)
    );
}

#[test]
fn selection_made_before_the_first_pass_survives_it() {
    let mut graph =
        GraphController::new(NullBackend::new(), GraphConfig::new(GraphKind::Bars))
            .expect("engine init");
    let proxy = BarDataProxy::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).expect("finite rows");
    let id = graph.create_series(Series::bar(proxy));
    graph.add_series(id).expect("bar series fits a bar graph");
    let position = SelectionPosition::Bar { row: 0, column: 0 };
    assert_eq!(graph.set_selected_item(id, position), Ok(true));

    let report = graph.synchronize().expect("sync");
    assert!(!report.selection_cleared);
    assert_eq!(
        graph.render_state().selection(),
        Selection::Item {
            series: id,
            position
        }
    );
}

#[test]
fn removing_later_bar_rows_keeps_a_valid_selection() {
    let (mut graph, id) = bar_graph(
        SelectionFlags::ITEM,
        vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
    );
    let position = SelectionPosition::Bar { row: 0, column: 0 };
    graph
        .set_selected_item(id, position)
        .expect("attached series");
    graph.synchronize().expect("sync");

    graph
        .series_mut(id)
        .and_then(Series::bar_proxy_mut)
        .expect("bar proxy")
        .remove_rows(2, 1);
    let report = graph.synchronize().expect("sync");
    assert!(!report.selection_cleared);
    assert_eq!(graph.selection(), Selection::Item { series: id, position });

    graph
        .series_mut(id)
        .and_then(Series::bar_proxy_mut)
        .expect("bar proxy")
        .reset_rows(vec![vec![7.0, 8.0]])
        .expect("finite rows");
    let report = graph.synchronize().expect("sync");
    assert!(!report.selection_cleared);
    assert_eq!(graph.render_state().selection(), Selection::Item { series: id, position });
}

#[test]
fn removing_the_selected_bar_row_clears_the_selection() {
    let (mut graph, id) = bar_graph(
        SelectionFlags::ITEM,
        vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
    );
    graph
        .set_selected_item(id, SelectionPosition::Bar { row: 2, column: 1 })
        .expect("attached series");
    graph.synchronize().expect("sync");

    graph
        .series_mut(id)
        .and_then(Series::bar_proxy_mut)
        .expect("bar proxy")
        .remove_rows(2, 1);
    let report = graph.synchronize().expect("sync");
    assert!(report.selection_cleared);
    assert!(graph.selection().is_none());
}

#[test]
fn swapping_the_bar_proxy_clears_the_selection() {
    let (mut graph, id) = bar_graph(SelectionFlags::ITEM, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    graph
        .set_selected_item(id, SelectionPosition::Bar { row: 0, column: 0 })
        .expect("attached series");
    graph.synchronize().expect("sync");

    let replacement =
        BarDataProxy::from_rows(vec![vec![9.0, 9.0], vec![9.0, 9.0]]).expect("finite rows");
    graph
        .series_mut(id)
        .expect("series")
        .set_data(SeriesData::Bar(replacement))
        .expect("bar data");
    let report = graph.synchronize().expect("sync");
    assert!(report.selection_cleared);
    assert!(graph.render_state().selection().is_none());
}

#[test]
fn detaching_the_selected_series_clears_the_selection() {
    let (mut graph, id) = scatter_graph(three_points());
    graph
        .set_selected_item(id, SelectionPosition::Scatter { index: 1 })
        .expect("attached series");
    graph.synchronize().expect("sync");

    assert!(graph.remove_series(id));
    let report = graph.synchronize().expect("sync");
    assert!(report.selection_cleared);
    assert!(graph.render_state().selection().is_none());
}

#[test]
fn selecting_in_a_detached_series_is_an_error() {
    let (mut graph, _) = scatter_graph(three_points());
    let loose = graph.create_series(Series::scatter(ScatterDataProxy::new()));
    assert_eq!(
        graph.set_selected_item(loose, SelectionPosition::Scatter { index: 0 }),
        Err(GraphError::UnknownSeries(loose))
    );
}

#[test]
fn wrong_position_kind_is_rejected() {
    let (mut graph, id) = scatter_graph(three_points());
    assert_eq!(
        graph.set_selected_item(id, SelectionPosition::Bar { row: 0, column: 0 }),
        Ok(false)
    );
}
