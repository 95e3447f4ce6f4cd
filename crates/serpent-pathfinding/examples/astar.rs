use std::collections::HashSet;
use std::sync::Arc;

use serpent_pathfinding::astar::find_path;
use serpent_pathfinding::{Grid, GridPoint, Occupant, Tile};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // '#' = obstacle, '.' = free, top row first
    let rows = [
        "..........",
        ".##....##.",
        "....#.....",
        "..####.#..",
        ".....#.#..",
        ".###.#.##.",
        "...#......",
        ".#.#.###..",
        ".#........",
        "...###....",
    ];

    let wall: Arc<dyn Occupant> = Tile::obstacle();
    let size_y = rows.len() as i32;
    let size_x = rows[0].len() as i32;
    let mut grid = Grid::new(size_x, size_y, 1.0, |p| {
        let row = rows[(size_y - 1 - p.y) as usize].as_bytes();
        (row[p.x as usize] == b'#').then(|| Arc::clone(&wall))
    })?;

    let start = GridPoint::new(0, 0);
    let goal = GridPoint::new(9, 9);

    println!("{}", grid);
    println!("Start: {}, Goal: {}", start, goal);

    let result = find_path(&mut grid, start, goal);
    println!("\n{}", result);

    match result.into_path() {
        Some(waypoints) => {
            println!("Waypoints: {:?}", waypoints);
            let marked: HashSet<GridPoint> = waypoints.iter().copied().collect();

            println!("\nGrid with waypoints:");
            for y in (0..size_y).rev() {
                for x in 0..size_x {
                    let p = GridPoint::new(x, y);
                    if p == start {
                        print!("S ");
                    } else if p == goal {
                        print!("G ");
                    } else if marked.contains(&p) {
                        print!("* ");
                    } else if grid.is_walkable(p) {
                        print!(". ");
                    } else {
                        print!("X ");
                    }
                }
                println!();
            }
        }
        None => println!("\nNo path found."),
    }

    Ok(())
}
