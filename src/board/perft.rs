/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::Instant;

use crate::{Color, GameResult, Move, Position};

/// Counts the leaf nodes of the legal move tree of `position`, `depth` plies deep, with `color` to move first.
///
/// Every promotion kind counts as its own move.
/// See <https://www.chessprogramming.org/Perft>.
pub fn perft(position: &mut Position, color: Color, depth: usize) -> GameResult<u64> {
    if depth == 0 {
        return Ok(1);
    }

    let moves = position.all_legal_moves(color)?;

    // Bulk counting
    if depth == 1 {
        return Ok(moves.len() as u64);
    }

    let mut nodes = 0;
    for mv in moves {
        nodes += perft_after(position, color, mv, depth)?;
    }

    Ok(nodes)
}

/// Like [`perft`], but reports the node count under each root move separately.
pub fn splitperft(
    position: &mut Position,
    color: Color,
    depth: usize,
) -> GameResult<Vec<(Move, u64)>> {
    let depth = depth.max(1);
    let moves = position.all_legal_moves(color)?;

    let mut split = Vec::with_capacity(moves.len());
    for mv in moves {
        split.push((mv, perft_after(position, color, mv, depth)?));
    }

    Ok(split)
}

/// Plays `mv`, counts the nodes below it, and takes it back.
fn perft_after(position: &mut Position, color: Color, mv: Move, depth: usize) -> GameResult<u64> {
    let undo = position.make(mv.from, mv.to, mv.promotion)?;
    let nodes = perft(position, color.opponent(), depth - 1);
    position.unmake(undo)?;
    nodes
}

/// Runs [`splitperft`] and prints each root move's count, the total, and the speed.
pub fn print_perft(
    position: &mut Position,
    color: Color,
    depth: usize,
    split: bool,
) -> GameResult<u64> {
    let now = Instant::now();

    let nodes = if split {
        let results = splitperft(position, color, depth)?;
        for (mv, nodes) in &results {
            println!("{mv}\t{nodes}");
        }
        results.iter().map(|(_, nodes)| nodes).sum()
    } else {
        perft(position, color, depth)?
    };

    let elapsed = now.elapsed();
    let nps = nodes as f32 / elapsed.as_secs_f32();
    println!("\nNodes: {nodes}\nTime: {elapsed:?}\nNPS: {nps:.0}");

    Ok(nodes)
}
