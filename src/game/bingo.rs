//! Sound bingo: a teacher colours cells on the selected card.
//!
//! single click: white <-> blue; green and red stay put
//! double click (second click inside the window): green
//! right click: red
//! reset / card change: all white, click history cleared

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::BingoCard;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellColor {
  #[default]
  White,
  Blue,
  Green,
  Red,
}

#[derive(Clone, Debug, Serialize)]
pub struct BingoBoard {
  #[serde(skip)]
  cards: Vec<BingoCard>,
  card_index: usize,
  card_count: usize,
  grid: Vec<Vec<String>>,
  colors: Vec<Vec<CellColor>>,
  #[serde(skip)]
  last_click: HashMap<(usize, usize), u64>,
  #[serde(skip)]
  double_click_ms: u64,
}

impl BingoBoard {
  /// Catalog validation guarantees at least one rectangular card.
  pub fn new(cards: Vec<BingoCard>, double_click_ms: u64) -> Self {
    let mut board = Self {
      card_count: cards.len(),
      cards,
      card_index: 0,
      grid: Vec::new(),
      colors: Vec::new(),
      last_click: HashMap::new(),
      double_click_ms,
    };
    board.load_card(0);
    board
  }

  fn load_card(&mut self, index: usize) {
    self.card_index = index;
    self.grid = self.cards[index].grid.clone();
    self.reset();
  }

  pub fn select_card(&mut self, index: usize) -> bool {
    if index >= self.cards.len() {
      return false;
    }
    self.load_card(index);
    true
  }

  pub fn reset(&mut self) {
    self.colors = self.grid.iter().map(|row| vec![CellColor::White; row.len()]).collect();
    self.last_click.clear();
  }

  /// Left click at `now_ms` (any monotonic millisecond clock). False if off the grid.
  pub fn click(&mut self, row: usize, col: usize, now_ms: u64) -> bool {
    let window = self.double_click_ms;
    let Some(cell) = self.colors.get_mut(row).and_then(|r| r.get_mut(col)) else {
      return false;
    };
    let is_double = self
      .last_click
      .get(&(row, col))
      .map_or(false, |last| now_ms.saturating_sub(*last) < window);

    *cell = if is_double {
      CellColor::Green
    } else {
      match *cell {
        CellColor::White => CellColor::Blue,
        CellColor::Blue => CellColor::White,
        other => other,
      }
    };
    self.last_click.insert((row, col), now_ms);
    true
  }

  pub fn right_click(&mut self, row: usize, col: usize) -> bool {
    match self.colors.get_mut(row).and_then(|r| r.get_mut(col)) {
      Some(cell) => {
        *cell = CellColor::Red;
        true
      }
      None => false,
    }
  }

  pub fn color(&self, row: usize, col: usize) -> Option<CellColor> {
    self.colors.get(row)?.get(col).copied()
  }

  pub fn card_index(&self) -> usize { self.card_index }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn board() -> BingoBoard {
    let card = |c: &str| BingoCard { grid: vec![vec![c.to_string(); 4]; 5] };
    BingoBoard::new(vec![card("a"), card("b")], 300)
  }

  #[test]
  fn single_clicks_toggle_blue() {
    let mut b = board();
    assert!(b.click(0, 0, 1_000));
    assert_eq!(b.color(0, 0), Some(CellColor::Blue));
    assert!(b.click(0, 0, 2_000));
    assert_eq!(b.color(0, 0), Some(CellColor::White));
  }

  #[test]
  fn double_click_goes_green_from_any_colour() {
    for start in [CellColor::White, CellColor::Blue, CellColor::Green, CellColor::Red] {
      let mut b = board();
      match start {
        CellColor::Blue => { b.click(1, 1, 0); }
        CellColor::Green => { b.click(1, 1, 0); b.click(1, 1, 100); }
        CellColor::Red => { b.right_click(1, 1); }
        CellColor::White => {}
      }
      assert_eq!(b.color(1, 1), Some(start));
      b.click(1, 1, 10_000);
      b.click(1, 1, 10_299);
      assert_eq!(b.color(1, 1), Some(CellColor::Green), "starting from {:?}", start);
    }
  }

  #[test]
  fn clicks_at_the_window_edge_are_single() {
    let mut b = board();
    b.click(2, 2, 0);
    b.click(2, 2, 300);
    assert_eq!(b.color(2, 2), Some(CellColor::White));
  }

  #[test]
  fn right_click_always_red_and_single_click_keeps_it() {
    let mut b = board();
    b.click(0, 1, 0);
    b.click(0, 1, 50);
    b.right_click(0, 1);
    assert_eq!(b.color(0, 1), Some(CellColor::Red));
    b.click(0, 1, 5_000);
    assert_eq!(b.color(0, 1), Some(CellColor::Red));
  }

  #[test]
  fn card_change_resets_colours_and_history() {
    let mut b = board();
    b.click(0, 0, 1_000);
    assert!(b.select_card(1));
    assert_eq!(b.color(0, 0), Some(CellColor::White));
    // Previous click belonged to the old card; this is a fresh single click.
    b.click(0, 0, 1_100);
    assert_eq!(b.color(0, 0), Some(CellColor::Blue));
    assert!(!b.select_card(2));
    assert_eq!(b.card_index(), 1);
  }

  #[test]
  fn off_grid_clicks_are_ignored() {
    let mut b = board();
    assert!(!b.click(5, 0, 0));
    assert!(!b.right_click(0, 4));
  }
}
