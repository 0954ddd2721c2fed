pub mod block;
pub mod exercise;
pub mod workout;

pub use block::{
  BlockDay, BlockExercise, BlockPayload, BlockSummary, GeneratedWeek, PayloadWeek, PrescribedSet,
  Prescription, StoredBlock, TrainingBlock, WeekDay, WeekType,
};
pub use exercise::{BaseDay, BaseExercise, BaseWeek, Category, Tempo, WeekExercise};
pub use workout::{
  ActualSet, LogWorkoutExercise, LogWorkoutRequest, NewActualSet, WorkoutExerciseSummary,
  WorkoutSummary,
};
