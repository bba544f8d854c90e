use super::solver::{self, Board};
use crate::error::GenError;
use crate::games::grid::{all_positions, Pos};
use crate::module::Difficulty;
use crate::rng::Mulberry32;

/// Configuration for puzzle generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Digits to dig out of the solved grid
    pub removals: usize,
    /// Maximum filled-grid attempts before using the fallback grid
    pub max_attempts: usize,
    /// Placement budget for a single filled-grid attempt
    pub fill_budget: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::easy()
    }
}

impl GeneratorConfig {
    pub fn easy() -> Self {
        Self {
            removals: 45,
            max_attempts: 5,
            fill_budget: 200_000,
        }
    }

    pub fn medium() -> Self {
        Self {
            removals: 50,
            ..Self::easy()
        }
    }

    pub fn hard() -> Self {
        Self {
            removals: 55,
            ..Self::easy()
        }
    }

    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty.level() {
            1 => Self::easy(),
            2 => Self::medium(),
            _ => Self::hard(),
        }
    }
}

/// Sudoku puzzle generator
pub struct Generator {
    config: GeneratorConfig,
    rng: Mulberry32,
}

impl Generator {
    /// Create a generator with a specific seed for reproducibility
    pub fn with_seed(seed: u32, difficulty: Difficulty) -> Self {
        Self {
            config: GeneratorConfig::for_difficulty(difficulty),
            rng: Mulberry32::new(seed),
        }
    }

    pub fn with_config(seed: u32, config: GeneratorConfig) -> Self {
        Self {
            config,
            rng: Mulberry32::new(seed),
        }
    }

    /// Generate `(givens, solution)`. The givens always have exactly one completion.
    pub fn generate(&mut self) -> (Board, Board) {
        let solution = match self.generate_filled_grid() {
            Ok(grid) => grid,
            Err(err) => {
                tracing::debug!(%err, "sudoku fill exhausted, using fallback grid");
                fallback_solution()
            }
        };
        let givens = self.remove_cells(&solution);
        (givens, solution)
    }

    /// Generate a completely filled valid grid
    fn generate_filled_grid(&mut self) -> Result<Board, GenError> {
        for _ in 0..self.config.max_attempts {
            if let Ok(grid) = solver::fill_random(&mut self.rng, self.config.fill_budget) {
                return Ok(grid);
            }
        }
        Err(GenError::Exhausted)
    }

    /// Remove cells while maintaining unique solution
    fn remove_cells(&mut self, solution: &Board) -> Board {
        let mut grid = *solution;
        let mut positions: Vec<Pos> = all_positions(9, 9).collect();
        self.rng.shuffle(&mut positions);

        let mut removed = 0;
        for pos in positions {
            if removed >= self.config.removals {
                break;
            }
            let value = grid[pos.row][pos.col];
            grid[pos.row][pos.col] = 0;
            if solver::has_unique_solution(&grid) {
                removed += 1;
            } else {
                // Restore value
                grid[pos.row][pos.col] = value;
            }
        }
        grid
    }
}

/// A known-valid solved grid.
pub fn fallback_solution() -> Board {
    let mut grid = [[0u8; 9]; 9];
    for (row, line) in grid.iter_mut().enumerate() {
        for (col, cell) in line.iter_mut().enumerate() {
            *cell = ((row * 3 + row / 3 + col) % 9 + 1) as u8;
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_easy() {
        let mut generator = Generator::with_seed(42, Difficulty::EASY);
        let (givens, solution) = generator.generate();

        let given_count = givens.iter().flatten().filter(|&&v| v != 0).count();
        assert_eq!(given_count, 81 - 45);
        assert!(solver::has_unique_solution(&givens));
        assert_eq!(solver::solve(&givens), Some(solution));
    }

    #[test]
    fn test_generate_hard_keeps_uniqueness() {
        let mut generator = Generator::with_seed(7, Difficulty::HARD);
        let (givens, _) = generator.generate();
        assert!(solver::has_unique_solution(&givens));
    }

    #[test]
    fn test_fallback_solution_is_valid() {
        let grid = fallback_solution();
        assert!(solver::is_consistent(&grid));
        assert!(grid.iter().flatten().all(|&v| v != 0));
    }

    #[test]
    fn test_zero_budget_falls_back() {
        let config = GeneratorConfig {
            removals: 10,
            max_attempts: 2,
            fill_budget: 0,
        };
        let (givens, solution) = Generator::with_config(1, config).generate();
        assert_eq!(solution, fallback_solution());
        assert!(solver::has_unique_solution(&givens));
    }
}
