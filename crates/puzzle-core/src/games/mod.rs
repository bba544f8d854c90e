//! Puzzle families.

pub mod analogies;
pub mod drill;
pub mod estimation;
pub mod grid;
pub mod kenken;
pub mod letter_coding;
pub mod logic_grid;
pub mod mental_math;
pub mod minesweeper;
pub mod nonogram;
pub mod number_series;
pub mod odd_one_out;
pub mod points_table;
pub mod ratio_mixer;
pub mod routes;
pub mod scheduling;
pub mod sudoku;
pub mod syllogisms;
pub mod target_number;

pub use analogies::Analogies;
pub use drill::Drill;
pub use estimation::Estimation;
pub use kenken::KenKen;
pub use letter_coding::LetterCoding;
pub use logic_grid::LogicGrid;
pub use mental_math::MentalMath;
pub use minesweeper::Minesweeper;
pub use nonogram::Nonogram;
pub use number_series::NumberSeries;
pub use odd_one_out::OddOneOut;
pub use points_table::PointsTable;
pub use ratio_mixer::RatioMixer;
pub use routes::Routes;
pub use scheduling::Scheduling;
pub use sudoku::Sudoku;
pub use syllogisms::Syllogisms;
pub use target_number::TargetNumber;
