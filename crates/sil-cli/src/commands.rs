use anyhow::Context;
use chrono::{NaiveDate, Utc};
use colored::Colorize;

use sil_domain::{
    AcademicYear, Actor, Attendance, Certificate, CertificateStore, ClassSubject,
    InMemoryDirectory, NewCertificate, Semester, Student, Subject, Teacher,
};
use sil_ledger::{CallerContext, ConfirmMode};
use sil_server::{AppState, ServerConfig, SilServer};
use sil_types::{AttendanceStatus, CertificateType, Role};
use sil_verify::Verifier;

use crate::cli::{Cli, Command, DemoArgs, ServeArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Demo(args) => cmd_demo(args),
    }
}

fn seed_demo(
    directory: &InMemoryDirectory,
    certificates: &dyn CertificateStore,
) -> anyhow::Result<Certificate> {
    directory.insert_actor(Actor {
        id: 1,
        name: "Site Admin".into(),
        email: "admin@school.test".into(),
        role: Role::Admin,
    });
    directory.insert_actor(Actor {
        id: 9,
        name: "Ramon Ilagan".into(),
        email: "ramon@school.test".into(),
        role: Role::Teacher,
    });
    directory.insert_student(Student {
        id: 42,
        student_number: "S-0042".into(),
        first_name: "Jane".into(),
        last_name: "Cruz".into(),
    });
    directory.insert_teacher(Teacher {
        id: 5,
        actor_id: Some(9),
        first_name: "Ramon".into(),
        last_name: "Ilagan".into(),
    });
    directory.insert_subject(Subject {
        id: 3,
        code: "NAV-101".into(),
        name: "Basic Navigation".into(),
    });
    directory.insert_class_subject(ClassSubject {
        id: 7,
        subject_id: 3,
        teacher_id: Some(5),
    });
    directory.insert_academic_year(AcademicYear {
        id: 1,
        year_name: "2024-2025".into(),
    });
    directory.insert_semester(Semester {
        id: 2,
        semester_name: "Second Semester".into(),
    });

    let certificate = certificates.create(NewCertificate {
        certificate_number: "CERT-0001".into(),
        student_id: 42,
        issued_by: 5,
        certificate_type: CertificateType::Completion,
        title: "Basic Safety Training".into(),
        date_issued: NaiveDate::from_ymd_opt(2025, 1, 15).context("invalid demo date")?,
    })?;
    Ok(certificate)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind.parse().context("invalid bind address")?;
    }
    if let Some(token) = args.admin_token {
        config.admin_token = Some(token);
    }
    if args.async_confirm {
        config.confirm_mode = ConfirmMode::Async;
    }

    let (state, directory) = AppState::in_memory(&config);
    if args.demo {
        let certificate = seed_demo(directory.as_ref(), state.certificates.as_ref())?;
        let context = CallerContext::authenticated(config.admin_actor_id);
        state
            .recorder
            .register_certificate(state.certificates.as_ref(), certificate.id, &context)?;
        println!(
            "{} Seeded demo data (certificate {})",
            "✓".green().bold(),
            certificate.certificate_number.yellow()
        );
    }
    if config.admin_token.is_none() {
        println!(
            "{} No admin token configured; only the public verify endpoint is reachable.",
            "!".yellow().bold()
        );
    }

    println!("SIL server on {}", config.bind_addr.to_string().bold());
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(SilServer::new(config, state).serve())?;
    Ok(())
}

fn cmd_demo(_args: DemoArgs) -> anyhow::Result<()> {
    let config = ServerConfig::default();
    let (state, directory) = AppState::in_memory(&config);
    let certificate = seed_demo(directory.as_ref(), state.certificates.as_ref())?;
    let context = CallerContext::authenticated(1);

    // Attendance: fingerprint, verify, tamper, verify again.
    let now = Utc::now();
    let attendance = Attendance {
        id: 1,
        student_id: 42,
        class_subject_id: 7,
        attendance_date: NaiveDate::from_ymd_opt(2025, 1, 10).context("invalid demo date")?,
        status: AttendanceStatus::Present,
        created_at: now,
        updated_at: now,
    };
    let outcome = state.recorder.record_attendance(&attendance, &context, false);
    let tx = outcome
        .transaction()
        .context("attendance transaction was not recorded")?;
    println!(
        "{} Attendance fingerprinted: {} ({})",
        "✓".green().bold(),
        tx.hash.short_hex().yellow(),
        tx.kind.to_string().cyan()
    );

    let verifier = Verifier::new(state.directory.as_ref());
    println!(
        "  verify(unchanged) = {}",
        format!("{}", verifier.verify(&attendance, &tx.hash)?).green()
    );

    let mut tampered = attendance.clone();
    tampered.status = AttendanceStatus::Absent;
    println!(
        "  verify(tampered)  = {}",
        format!("{}", verifier.verify(&tampered, &tx.hash)?).red()
    );

    // Certificate: register, then the public verification flow.
    state
        .recorder
        .register_certificate(state.certificates.as_ref(), certificate.id, &context)?;
    let outcome = state
        .verifier
        .verify_certificate("CERT-0001", "Demo Observer")?;
    println!(
        "{} Certificate {} verified: matched = {}",
        "✓".green().bold(),
        outcome.certificate.certificate_number.yellow(),
        format!("{}", outcome.matched).green()
    );

    let stats = state.ledger.stats()?;
    println!(
        "Ledger: {} transactions, {} confirmed ({}% success)",
        stats.total_transactions.to_string().bold(),
        stats.confirmed_count,
        stats.success_rate
    );
    Ok(())
}
