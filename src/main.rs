//! motus - workout routine planner

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use motus::db::{Database, WorkoutData, WorkoutRecord};
use motus::exercises::ExerciseType;
use motus::motfile;
use motus::workout::names::{workout_name_check_error_msg, workout_name_valid};
use motus::workout::row::{ExerciseExecutionRow, TableRow};
use motus::workout::{ExecutionField, WorkoutTable};

#[derive(Parser)]
#[command(name = "motus")]
#[command(author, version, about = "Workout routine planner")]
struct Cli {
    /// SQLite database path
    #[arg(long, env = "MOTUS_DB", default_value = "motus.db")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List exercises
    Exercises {
        /// Filter by exercise type (Strength, Cardio, Stretching, Mobility)
        #[arg(short = 't', long = "type")]
        exer_type: Option<String>,
    },

    /// List saved workouts
    List,

    /// Show a workout table
    Show {
        /// Workout name
        workout: String,
    },

    /// Create a new empty workout
    Create {
        /// Workout name (generated when omitted)
        name: Option<String>,

        /// Workout type label
        #[arg(short = 't', long = "type", default_value = "Strength")]
        workout_type: String,
    },

    /// Add an exercise row to a workout
    Add {
        workout: String,

        /// Exercise name or slug
        exercise: String,

        #[arg(long)]
        sets: Option<i32>,

        #[arg(long)]
        reps: Option<i32>,

        /// Pause in minutes
        #[arg(long)]
        pause: Option<i32>,

        /// Row index to insert at (appended when omitted)
        #[arg(long)]
        at: Option<usize>,
    },

    /// Remove rows from a workout
    Remove {
        workout: String,

        /// Row indices
        rows: Vec<usize>,
    },

    /// Move a row up or down
    Move {
        workout: String,
        row: usize,
        direction: Direction,
    },

    /// Group a contiguous row range into a superset
    Group {
        workout: String,

        /// First row of the range
        first: usize,

        /// Last row of the range (inclusive)
        last: usize,
    },

    /// Dissolve a superset
    Ungroup {
        workout: String,

        /// Superset number as shown in the table
        number: i32,
    },

    /// Set a cell value
    Set {
        workout: String,
        row: usize,
        field: FieldArg,
        value: i32,
    },

    /// Export a workout to a .motwork file
    Export {
        workout: String,

        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Import a workout from a .motwork file
    Import { path: PathBuf },

    /// Export a week plan to a .motplan file
    ExportPlan {
        plan: String,

        #[arg(long, default_value = ".")]
        dir: PathBuf,

        #[arg(long)]
        force: bool,
    },

    /// Import a week plan from a .motplan file
    ImportPlan { path: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldArg {
    Sets,
    Reps,
    Pause,
}

impl From<FieldArg> for ExecutionField {
    fn from(field: FieldArg) -> Self {
        match field {
            FieldArg::Sets => ExecutionField::Sets,
            FieldArg::Reps => ExecutionField::Reps,
            FieldArg::Pause => ExecutionField::Pause,
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let db = Database::open(&cli.db)?;

    match cli.command {
        Commands::Exercises { exer_type } => {
            let filter = match exer_type {
                Some(name) => Some(
                    ExerciseType::parse(&name)
                        .with_context(|| format!("unknown exercise type {name:?}"))?,
                ),
                None => None,
            };
            for exer in db.list_exercises(filter)? {
                println!("{:30} {}", exer.name, exer.exer_type.name());
            }
        }

        Commands::List => {
            for (_, name, workout_time) in db.list_workouts()? {
                println!("{name:40} {workout_time:>4} min");
            }
        }

        Commands::Show { workout } => {
            let (_, table) = load_workout(&db, &workout)?;
            print_table(&table);
        }

        Commands::Create { name, workout_type } => {
            let name = match name {
                Some(name) => {
                    if !workout_name_valid(&name) {
                        bail!(workout_name_check_error_msg());
                    }
                    name
                }
                None => db.available_workout_name()?,
            };
            let data = WorkoutData {
                name: name.clone(),
                workout_type,
                rows: Vec::new(),
                workout_time: 0,
            };
            db.insert_workout(&data)?;
            println!("Created workout: {name}");
        }

        Commands::Add {
            workout,
            exercise,
            sets,
            reps,
            pause,
            at,
        } => {
            let (record, mut table) = load_workout(&db, &workout)?;
            let exer = db
                .find_exercise_by_name(&exercise)?
                .with_context(|| format!("exercise {exercise:?} not found"))?;
            let exer_ref = motus::workout::ExerciseRef {
                exer_id: exer.id,
                name: exer.name.clone(),
                icon: exer.icon.clone(),
            };
            let mut row = ExerciseExecutionRow::with_defaults(&exer_ref, exer.exer_type);
            for (field, value) in [
                (ExecutionField::Sets, sets),
                (ExecutionField::Reps, reps),
                (ExecutionField::Pause, pause),
            ] {
                if let Some(value) = value {
                    if !field.valid(value) {
                        bail!(field.error_msg());
                    }
                    match field {
                        ExecutionField::Sets => row.sets = value,
                        ExecutionField::Reps => row.reps = value,
                        ExecutionField::Pause => row.pause = value,
                    }
                }
            }
            let index = at.unwrap_or(table.len());
            table.insert_row(index, TableRow::ExerciseExecution(row));
            save_workout(&db, &record, &table)?;
            print_table(&table);
        }

        Commands::Remove { workout, rows } => {
            let (record, mut table) = load_workout(&db, &workout)?;
            table.remove_rows(&rows);
            save_workout(&db, &record, &table)?;
            print_table(&table);
        }

        Commands::Move {
            workout,
            row,
            direction,
        } => {
            let (record, mut table) = load_workout(&db, &workout)?;
            let to = match direction {
                Direction::Up => row.checked_sub(1),
                Direction::Down if row + 1 < table.len() => Some(row + 1),
                Direction::Down => None,
            };
            let Some(to) = to else {
                bail!("row {row} cannot move in that direction");
            };
            table.move_row(row, to);
            save_workout(&db, &record, &table)?;
            print_table(&table);
        }

        Commands::Group {
            workout,
            first,
            last,
        } => {
            if last < first {
                bail!("last row must not be before first row");
            }
            let (record, mut table) = load_workout(&db, &workout)?;
            let selection: Vec<usize> = (first..=last).collect();
            table.group_as_superset(&selection)?;
            save_workout(&db, &record, &table)?;
            print_table(&table);
        }

        Commands::Ungroup { workout, number } => {
            let (record, mut table) = load_workout(&db, &workout)?;
            table.ungroup_superset(number);
            save_workout(&db, &record, &table)?;
            print_table(&table);
        }

        Commands::Set {
            workout,
            row,
            field,
            value,
        } => {
            let (record, mut table) = load_workout(&db, &workout)?;
            table.set_value(row, field.into(), value)?;
            save_workout(&db, &record, &table)?;
            print_table(&table);
        }

        Commands::Export {
            workout,
            dir,
            force,
        } => {
            let record = db
                .workout_by_name(&workout)?
                .with_context(|| format!("workout {workout:?} not found"))?;
            let filepath = motfile::export_workout(&dir, &record.data, force)?;
            println!("Exported: {}", filepath.display());
        }

        Commands::Import { path } => {
            let data = motfile::import_workout(&path)?;
            let data = bind_imported_workout(&db, data)?;
            db.insert_workout(&data)?;
            println!(
                "Imported workout: {} ({} min)",
                data.name, data.workout_time
            );
        }

        Commands::ExportPlan { plan, dir, force } => {
            let (_, data) = db
                .plan_by_name(&plan)?
                .with_context(|| format!("plan {plan:?} not found"))?;
            let filepath = motfile::export_plan(&dir, &data, force)?;
            println!("Exported: {}", filepath.display());
        }

        Commands::ImportPlan { path } => {
            let mut data = motfile::import_plan(&path)?;
            for day in &mut data.days {
                if let Some(workout) = day.take() {
                    *day = Some(bind_imported_workout(&db, workout)?);
                }
            }
            if db.plan_name_taken(&data.name)? {
                let renamed = db.available_plan_name()?;
                println!("Plan name {:?} taken, importing as {renamed:?}", data.name);
                data.name = renamed;
            }
            db.insert_plan(&data)?;
            println!("Imported plan: {}", data.name);
        }
    }

    Ok(())
}

/// Rebuilds an imported workout against the local exercise store: rows
/// whose exercise does not exist here are dropped and reported, the
/// workout time is recomputed and a taken name is replaced.
fn bind_imported_workout(db: &Database, data: WorkoutData) -> Result<WorkoutData> {
    let (table, missing) = WorkoutTable::from_rows_data(&data.rows, db)?;
    if !missing.is_empty() {
        eprintln!(
            "Missing exercises dropped from {:?}: {}",
            data.name,
            missing.join(", ")
        );
    }
    let mut name = data.name;
    if db.workout_name_taken(&name)? {
        let renamed = db.available_workout_name()?;
        println!("Workout name {name:?} taken, importing as {renamed:?}");
        name = renamed;
    }
    Ok(WorkoutData {
        name,
        workout_type: data.workout_type,
        rows: table.to_rows_data(),
        workout_time: table.workout_time_minutes(),
    })
}

fn load_workout(db: &Database, name: &str) -> Result<(WorkoutRecord, WorkoutTable)> {
    let record = db
        .workout_by_name(name)?
        .with_context(|| format!("workout {name:?} not found"))?;
    let (table, missing) = WorkoutTable::from_rows_data(&record.data.rows, db)?;
    if !missing.is_empty() {
        eprintln!("Missing exercises removed from table: {}", missing.join(", "));
    }
    Ok((record, table))
}

fn save_workout(db: &Database, record: &WorkoutRecord, table: &WorkoutTable) -> Result<()> {
    let data = WorkoutData {
        name: record.data.name.clone(),
        workout_type: record.data.workout_type.clone(),
        rows: table.to_rows_data(),
        workout_time: table.workout_time_minutes(),
    };
    db.update_workout(record.id, &data)
}

fn print_table(table: &WorkoutTable) {
    println!(
        "{:3} {:30} {:>6} {:>10} {:>7}",
        "#", "Exercise", "Sets", "Reps/Time", "Pause"
    );
    println!("{:-<60}", "");
    for (index, row) in table.rows().iter().enumerate() {
        match row {
            TableRow::SupersetTop(top) => {
                println!("{index:3} ----- {} -----", top.text());
            }
            TableRow::SupersetBottom(bottom) => {
                println!(
                    "{index:3} {:30} {:>6} {:>10} {:>7}",
                    "",
                    bottom.sets,
                    "",
                    format!("{} min", bottom.pause)
                );
            }
            TableRow::ExerciseExecution(exec) => {
                // sets/pause of superset members are governed by the
                // block's bottom row
                let (sets, pause) = if exec.superset_numb.is_some() {
                    ("-".to_string(), "-".to_string())
                } else {
                    (exec.sets.to_string(), format!("{} min", exec.pause))
                };
                let reps = if exec.on_reps {
                    exec.reps.to_string()
                } else {
                    format!("{} min", exec.reps)
                };
                println!(
                    "{index:3} {:30} {:>6} {:>10} {:>7}",
                    exec.name, sets, reps, pause
                );
            }
        }
    }
    println!("Total: {} min", table.workout_time_minutes());
}
