use std::collections::HashSet;

use grid_pathfinder::{
    minify_path, reconstruct, Grid, Outcome, Position, Route, Search, SearchConfig, SearchStats,
};
use log::info;
use serde::Serialize;

#[derive(Serialize)]
struct Report<'a> {
    route: &'a Route,
    turns: Vec<Position>,
    stats: SearchStats,
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut grid = Grid::default();
    let wall_col = grid.columns() / 2;
    for row in 0..grid.rows() - 5 {
        grid.set_passable(row, wall_col, false).unwrap();
    }
    grid.compute_adjacency();

    let start = Position::new(5, 5);
    let end = Position::new(5, grid.columns() - 6);

    let mut search = match Search::new(&mut grid, start, end, SearchConfig::default()) {
        Ok(search) => search,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    let outcome = search.run();
    let stats = search.stats();

    match outcome {
        Outcome::Found(found) => {
            let route = reconstruct(&grid, &found).unwrap();
            info!("route of {} cells, cost {:.3}", route.len(), route.cost());

            println!("{}", render(&grid, &route));
            let report = Report {
                route: &route,
                turns: minify_path(route.cells().to_vec()),
                stats,
            };
            println!("{}", serde_json::to_string(&report).unwrap());
        }
        outcome => println!("{outcome} after {stats:?}"),
    }
}

fn render(grid: &Grid, route: &Route) -> String {
    let on_route: HashSet<&Position> = route.interior().iter().collect();
    let (start, end) = (route.cells()[0], route.cells()[route.len() - 1]);

    let mut out = String::with_capacity(grid.cell_count() + grid.rows());
    for cell in grid.cells() {
        let position = cell.position();
        out.push(if position == start || position == end {
            'S'
        } else if on_route.contains(&position) {
            '*'
        } else if !cell.is_passable() {
            '#'
        } else if cell.is_visited() {
            '.'
        } else {
            ' '
        });

        if cell.col() == grid.columns() - 1 {
            out.push('\n');
        }
    }
    out
}
