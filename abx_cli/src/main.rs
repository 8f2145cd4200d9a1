use abx_core::audit::{recent_records, AuditRecord, AuditSink, JsonlAuditSink};
use abx_core::batch::{read_profiles, write_summaries, SummaryRow};
use abx_core::biometrics;
use abx_core::config::AUDIT_LOG_FILE;
use abx_core::*;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "abx")]
#[command(about = "Antibiotic recommendation engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override reference tables (JSON or TOML)
    #[arg(long, global = true)]
    tables: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend an antibiotic regimen for one patient profile
    Recommend {
        /// Patient profile JSON file
        #[arg(long)]
        profile: PathBuf,

        /// Current medication list JSON file
        #[arg(long)]
        medications: Option<PathBuf>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Do not append an audit record
        #[arg(long)]
        no_audit: bool,
    },

    /// Recommend for every profile in a CSV file
    Batch {
        /// Input CSV with one profile per row
        #[arg(long)]
        input: PathBuf,

        /// Output CSV for the summary rows
        #[arg(long)]
        output: PathBuf,
    },

    /// Standalone biometric calculators
    Calc {
        #[command(subcommand)]
        calc: CalcCommand,
    },

    /// Inspect the reference tables
    Tables {
        #[command(subcommand)]
        action: TablesCommand,
    },

    /// De-identified advisory summary JSON for a profile
    Summary {
        /// Patient profile JSON file
        #[arg(long)]
        profile: PathBuf,

        /// Print the plain-text prompt rendering instead of JSON
        #[arg(long)]
        prompt: bool,
    },

    /// List recent audit records
    Audit {
        /// Maximum number of records to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum CalcCommand {
    /// Body mass index
    Bmi {
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        height: f64,
    },
    /// Ideal body weight (Devine)
    Ibw {
        #[arg(long)]
        height: f64,
        #[arg(long, value_parser = parse_sex)]
        sex: Sex,
    },
    /// Adjusted body weight
    Abw {
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        height: f64,
        #[arg(long, value_parser = parse_sex)]
        sex: Sex,
    },
    /// Creatinine clearance (Cockcroft-Gault) using the weight given
    Crcl {
        #[arg(long)]
        age: f64,
        #[arg(long)]
        weight: f64,
        /// Serum creatinine in mg/dL
        #[arg(long)]
        creatinine: f64,
        #[arg(long, value_parser = parse_sex)]
        sex: Sex,
    },
    /// GFR category for a clearance value
    Gfr {
        #[arg(long)]
        value: f64,
    },
}

#[derive(Subcommand)]
enum TablesCommand {
    /// Check the tables for consistency
    Validate,
    /// Write the tables as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    abx_core::logging::init_with_level(&config.logging.level);

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::Recommend {
            profile,
            medications,
            json,
            no_audit,
        } => {
            let tables = load_tables(cli.tables.as_deref(), &config)?;
            let audit = config.audit.enabled && !no_audit;
            cmd_recommend(
                &profile,
                medications.as_deref(),
                json,
                audit.then(|| data_dir.join(AUDIT_LOG_FILE)),
                &tables,
            )
        }
        Commands::Batch { input, output } => {
            let tables = load_tables(cli.tables.as_deref(), &config)?;
            cmd_batch(&input, &output, &tables)
        }
        Commands::Calc { calc } => cmd_calc(calc),
        Commands::Tables { action } => {
            let tables = load_tables(cli.tables.as_deref(), &config)?;
            cmd_tables(action, &tables)
        }
        Commands::Summary { profile, prompt } => {
            let tables = load_tables(cli.tables.as_deref(), &config)?;
            cmd_summary(&profile, prompt, &tables)
        }
        Commands::Audit { limit } => cmd_audit(&data_dir.join(AUDIT_LOG_FILE), limit),
    }
}

fn load_tables(override_path: Option<&Path>, config: &Config) -> Result<ReferenceTables> {
    match override_path {
        Some(path) => ReferenceTables::load_from(path),
        None => config.reference_tables(),
    }
}

fn load_profile(path: &Path) -> Result<PatientProfile> {
    let contents = std::fs::read_to_string(path)?;
    let profile: PatientProfile = serde_json::from_str(&contents)?;
    profile.validate()?;
    Ok(profile)
}

fn parse_sex(value: &str) -> std::result::Result<Sex, String> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|_| format!("unknown sex '{}' (male, female, other, unknown)", value))
}

fn cmd_recommend(
    profile_path: &Path,
    medications: Option<&Path>,
    json: bool,
    audit_path: Option<PathBuf>,
    tables: &ReferenceTables,
) -> Result<()> {
    let mut profile = load_profile(profile_path)?;

    if let Some(path) = medications {
        match load_current_medications(path)? {
            Some(list) => profile.current_medications = Some(list),
            None => eprintln!(
                "Medication list unavailable at {}; interaction check skipped",
                path.display()
            ),
        }
    }

    let result = recommend_with(&profile, tables);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        display_result(&result);
    }

    if let Some(path) = audit_path {
        let mut sink = JsonlAuditSink::new(path);
        sink.append(&AuditRecord::new(&profile, &result))?;
        tracing::info!("Audit record appended to {:?}", sink.path());
    }

    Ok(())
}

fn cmd_batch(input: &Path, output: &Path, tables: &ReferenceTables) -> Result<()> {
    let entries = read_profiles(input)?;

    let rows: Vec<SummaryRow> = entries
        .iter()
        .map(|entry| SummaryRow::new(&entry.patient_ref, &recommend_with(&entry.profile, tables)))
        .collect();
    let consultations = rows.iter().filter(|row| row.consultation_required).count();

    let count = write_summaries(output, &rows)?;
    println!("✓ Wrote {} recommendations to {}", count, output.display());
    if consultations > 0 {
        println!("  {} require specialist consultation", consultations);
    }
    Ok(())
}

fn cmd_calc(calc: CalcCommand) -> Result<()> {
    let positive = |name: &str, value: f64| {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(Error::Other(format!("{} must be positive, got {}", name, value)))
        }
    };

    match calc {
        CalcCommand::Bmi { weight, height } => {
            let value = biometrics::bmi(positive("weight", weight)?, positive("height", height)?);
            println!("BMI: {:.1} ({:?})", value, biometrics::bmi_category(value));
        }
        CalcCommand::Ibw { height, sex } => {
            let ideal = biometrics::ideal_body_weight(positive("height", height)?, sex);
            println!("Ideal body weight: {:.1} kg", ideal);
        }
        CalcCommand::Abw { weight, height, sex } => {
            let ideal = biometrics::ideal_body_weight(positive("height", height)?, sex);
            let adjusted = biometrics::adjusted_body_weight(positive("weight", weight)?, ideal);
            println!("Ideal body weight: {:.1} kg", ideal);
            println!("Adjusted body weight: {:.1} kg", adjusted);
        }
        CalcCommand::Crcl {
            age,
            weight,
            creatinine,
            sex,
        } => {
            let clearance =
                biometrics::creatinine_clearance(age, weight, creatinine, sex == Sex::Female)
                    .ok_or_else(|| {
                        Error::Other("weight and creatinine must be positive".into())
                    })?;
            let category = biometrics::gfr_category(clearance);
            println!("Creatinine clearance: {:.1} mL/min", clearance);
            println!("GFR category: {} ({})", category, category.description());
        }
        CalcCommand::Gfr { value } => {
            let category = biometrics::gfr_category(value);
            println!("GFR category: {} ({})", category, category.description());
        }
    }
    Ok(())
}

fn cmd_tables(action: TablesCommand, tables: &ReferenceTables) -> Result<()> {
    match action {
        TablesCommand::Validate => {
            let errors = tables.validate();
            if !errors.is_empty() {
                eprintln!("Reference table validation errors:");
                for error in &errors {
                    eprintln!("  - {}", error);
                }
                return Err(Error::ReferenceData(format!(
                    "{} validation error(s)",
                    errors.len()
                )));
            }
            println!("✓ Reference tables version {} are valid", tables.version);
            println!("  Guidelines: {}", tables.guidelines.len());
            println!("  Formulary drugs: {}", tables.formulary.len());
        }
        TablesCommand::Export { output } => {
            let json = tables.to_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("✓ Exported tables version {} to {}", tables.version, path.display());
                }
                None => println!("{}", json),
            }
        }
    }
    Ok(())
}

fn cmd_summary(profile_path: &Path, prompt: bool, tables: &ReferenceTables) -> Result<()> {
    let profile = load_profile(profile_path)?;
    let result = recommend_with(&profile, tables);
    let summary = AdvisorySummary::from_result(&profile, &result);
    if prompt {
        print!("{}", summary.to_prompt());
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn cmd_audit(path: &Path, limit: usize) -> Result<()> {
    let records = recent_records(path, limit)?;
    if records.is_empty() {
        println!("No audit records found.");
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {}  {} {}  -> {}",
            record.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            record.id,
            record.profile.infection_site,
            record.result.rationale.severity,
            record.result.primary.name
        );
    }
    Ok(())
}

fn display_result(result: &RecommendationResult) {
    let primary = &result.primary;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", result.rationale.infection_type.to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", primary.name);
    if !primary.is_consultation_required() {
        println!("  {} {} for {}", primary.dose, primary.route, primary.duration);
    }
    println!("  {}", primary.reason);

    println!();
    println!(
        "  Severity: {} (score {}, {})",
        result.rationale.severity,
        result.rationale.scored_severity.points,
        result.rationale.scored_severity.tier
    );

    if !result.alternatives.is_empty() {
        println!();
        println!("  Alternatives:");
        for alternative in &result.alternatives {
            println!(
                "  → {} {} {} for {}",
                alternative.name, alternative.dose, alternative.route, alternative.duration
            );
        }
    }

    let calculations = &result.calculations;
    if let Some(ref dose) = calculations.weight_based {
        println!();
        println!(
            "  Weight-based: {:.0} mg ({} mg/kg x {:.1} kg {:?}, max {:.0} mg)",
            dose.dose_mg, dose.mg_per_kg, dose.dosing_weight_kg, dose.weight_basis, dose.max_dose_mg
        );
    }
    if let Some(ref renal) = calculations.renal_adjustment {
        println!();
        match (renal.creatinine_clearance_ml_min, renal.gfr_category) {
            (Some(clearance), Some(category)) => {
                println!("  Renal: CrCl {:.1} mL/min ({})", clearance, category)
            }
            _ => println!("  Renal: function unknown"),
        }
        println!("  → {}", renal.guidance);
    }

    for line in &result.rationale.dose_adjustments {
        println!("  ⚠ {}", line);
    }

    if !result.precautions.is_empty() {
        println!();
        println!("  Precautions:");
        for precaution in &result.precautions {
            println!("  ⚠ {}", precaution);
        }
    }

    for consideration in &result.rationale.allergy_considerations {
        println!("  ℹ {}", consideration);
    }

    if !result.rationale.likely_pathogens.is_empty() {
        println!();
        println!("  Likely pathogens:");
        for pathogen in &result.rationale.likely_pathogens {
            println!("  → {} ({}%)", pathogen.pathogen, pathogen.probability);
        }
    }

    println!();
    println!("  Reference tables {}", result.tables_version);
    println!();
}
