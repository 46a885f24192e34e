use cohort::cli::reconcile_students;
use cohort::cli::seeder::{SeedConfig, clear_all, seed_all};
use cohort_config::EmailConfig;
use cohort_models::StudentId;
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "cohort-cli")]
#[command(about = "Cohort CLI - Administrative tools for Cohort", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database with fake instructors, courses, students and groups
    Seed {
        /// Number of students to create
        #[arg(short = 's', long, default_value = "200")]
        students: usize,

        /// Number of groups to create
        #[arg(short = 'g', long, default_value = "8")]
        groups: usize,

        /// Number of instructors to create
        #[arg(long, default_value = "10")]
        instructors: usize,

        /// Number of courses to create
        #[arg(long, default_value = "20")]
        courses: usize,

        /// Skip reconciling the seeded students
        #[arg(long)]
        no_reconcile: bool,
    },
    /// Bring enrollments in line with group membership
    Reconcile {
        /// Student to reconcile (repeatable); every student when omitted
        #[arg(long = "student")]
        students: Vec<StudentId>,

        /// Do not ask for confirmation before reconciling every student
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Clear all seeded data
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize database connection
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed {
            students,
            groups,
            instructors,
            courses,
            no_reconcile,
        } => {
            let config = SeedConfig {
                instructors,
                courses,
                ..SeedConfig::default()
            }
            .with_students(students)
            .with_groups(groups);
            handle_seed(&pool, config, no_reconcile).await
        }
        Commands::Reconcile { students, yes } => handle_reconcile(&pool, students, yes).await,
        Commands::ClearSeed => handle_clear_seed(&pool).await,
    }
}

async fn handle_seed(pool: &sqlx::postgres::PgPool, config: SeedConfig, no_reconcile: bool) {
    let student_ids = match seed_all(pool, config).await {
        Ok(ids) => ids,
        Err(e) => {
            eprintln!("\n❌ Error seeding database: {}", e);
            std::process::exit(1);
        }
    };

    if no_reconcile || student_ids.is_empty() {
        return;
    }

    // Seeded addresses are fake, never mail them
    if let Err(e) = reconcile_students(pool, &student_ids, EmailConfig::default()).await {
        eprintln!("\n❌ Error reconciling seeded students: {}", e);
        std::process::exit(1);
    }
}

async fn handle_reconcile(pool: &sqlx::postgres::PgPool, students: Vec<StudentId>, yes: bool) {
    if students.is_empty() && !yes {
        let confirmed = Confirm::new()
            .with_prompt("Reconcile every student?")
            .default(false)
            .interact()
            .expect("Failed to read confirmation");

        if !confirmed {
            println!("Aborted.");
            return;
        }
    }

    if let Err(e) = reconcile_students(pool, &students, EmailConfig::from_env()).await {
        eprintln!("\n❌ Error reconciling students: {}", e);
        std::process::exit(1);
    }
}

async fn handle_clear_seed(pool: &sqlx::postgres::PgPool) {
    match clear_all(pool).await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("\n❌ Error clearing seeded data: {}", e);
            std::process::exit(1);
        }
    }
}
