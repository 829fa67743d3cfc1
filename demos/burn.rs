//! Minimal end-to-end burn: one polygon with a hole onto a 20x20 grid.
use gridburn::scan_burn;

fn main() {
    let donut = geo_types::Polygon::new(
        geo_types::LineString::from(vec![(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)]),
        vec![geo_types::LineString::from(vec![
            (3.5, 3.5),
            (6.5, 3.5),
            (6.5, 6.5),
            (3.5, 6.5),
        ])],
    );

    let result = scan_burn([donut], (0.0, 0.0, 10.0, 10.0), (20, 20)).expect("valid grid");

    println!(
        "{} runs, {} edges, {} skipped",
        result.runs.len(),
        result.edges.len(),
        result.skipped
    );
    for run in result.runs.iter().take(8) {
        println!("run  row {:>2} cols {:>2}..{:<2} id {}", run.row, run.col_start, run.col_end, run.id);
    }
    for edge in result.edges.iter().take(8) {
        println!("edge row {:>2} col {:>2} weight {:.3}", edge.row, edge.col, edge.weight);
    }

    let covered: f64 = result
        .runs
        .iter()
        .map(|r| (r.col_end - r.col_start + 1) as f64)
        .sum::<f64>()
        + result.edges.iter().map(|e| e.weight as f64).sum::<f64>();
    println!("covered area: {}", covered * 0.25);
}
