// src/output.rs
// =============================================================================
// Printing results, either as pretty JSON (--json) or as plain text tables.
//
// JSON goes to stdout untouched so it can be piped into jq; logs go to
// stderr (see main.rs), so the two never mix.
// =============================================================================

use anyhow::Result;
use serde::Serialize;

use crate::error::ValidationErrors;
use crate::gateway::{Finding, ReportRow};
use crate::ohdear::{CertificateHealth, Check, DowntimePeriod, MaintenancePeriod, Site, Uptime};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// Prints a broken links / mixed content report
pub fn print_report(rows: &[ReportRow], json: bool) -> Result<()> {
    if json {
        return print_json(rows);
    }

    println!(
        "{:<50} {:<12} {:<40} {:<30}",
        "URL", "FINDING", "FOUND ON", "ELEMENT"
    );
    println!("{}", "=".repeat(135));

    for row in rows {
        let element = match &row.element {
            Some(element) => format!("#{} {} ({})", element.id, element.title, element.status),
            None => "-".to_string(),
        };

        println!(
            "{:<50} {:<12} {:<40} {:<30}",
            truncate(&row.source_url, 50),
            format_finding(&row.finding),
            truncate(&row.found_on_url, 40),
            element
        );
    }

    println!();

    let resolved = rows.iter().filter(|r| r.is_resolved()).count();
    println!("📊 Summary:");
    println!("   📋 Total: {}", rows.len());
    println!("   🔗 Linked to content: {}", resolved);
    println!("   ❔ Not linked: {}", rows.len() - resolved);

    Ok(())
}

fn format_finding(finding: &Finding) -> String {
    match finding {
        Finding::BrokenLink {
            status_code: Some(code),
        } => format!("❌ HTTP {}", code),
        Finding::BrokenLink { status_code: None } => "❌ NO REPLY".to_string(),
        Finding::MixedContent { element_name } => format!("🔓 <{}>", element_name),
    }
}

pub fn print_validation(errors: Option<&ValidationErrors>, json: bool) -> Result<()> {
    if json {
        let violations = errors.map(|e| e.violations.as_slice()).unwrap_or(&[]);
        return print_json(violations);
    }

    match errors {
        None => println!("✅ Settings are valid"),
        Some(errors) => {
            println!("❌ Settings are invalid:");
            for violation in &errors.violations {
                println!("   {}: {}", violation.field, violation.message);
            }
        }
    }
    Ok(())
}

pub fn print_sites(sites: &[Site], json: bool) -> Result<()> {
    if json {
        return print_json(sites);
    }

    println!("{:<10} {:<50} {:<15}", "ID", "URL", "RESULT");
    println!("{}", "=".repeat(75));
    for site in sites {
        println!(
            "{:<10} {:<50} {:<15}",
            site.id,
            truncate(&site.url, 50),
            site.summarized_check_result.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub fn print_site(site: &Site, json: bool) -> Result<()> {
    if json {
        return print_json(site);
    }

    println!("🌐 {} (#{})", site.url, site.id);
    if let Some(label) = &site.label {
        println!("   Label: {}", label);
    }
    println!(
        "   Last run: {}",
        site.latest_run_date.as_deref().unwrap_or("never")
    );
    println!();
    print_checks(&site.checks);
    Ok(())
}

pub fn print_check(check: &Check, json: bool) -> Result<()> {
    if json {
        return print_json(check);
    }
    print_checks(std::slice::from_ref(check));
    Ok(())
}

fn print_checks(checks: &[Check]) {
    println!("{:<10} {:<25} {:<10} {:<15}", "ID", "CHECK", "ENABLED", "LAST RESULT");
    println!("{}", "=".repeat(60));
    for check in checks {
        println!(
            "{:<10} {:<25} {:<10} {:<15}",
            check.id,
            check.label,
            if check.enabled { "yes" } else { "no" },
            check.latest_run_result.as_deref().unwrap_or("-")
        );
    }
}

pub fn print_maintenance_periods(periods: &[MaintenancePeriod], json: bool) -> Result<()> {
    if json {
        return print_json(periods);
    }

    println!("{:<10} {:<22} {:<22}", "ID", "STARTS AT", "ENDS AT");
    println!("{}", "=".repeat(54));
    for period in periods {
        println!(
            "{:<10} {:<22} {:<22}",
            period.id,
            period.starts_at,
            period.ends_at.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub fn print_uptime(uptime: &[Uptime], json: bool) -> Result<()> {
    if json {
        return print_json(uptime);
    }

    println!("{:<22} {:>10}", "PERIOD", "UPTIME");
    println!("{}", "=".repeat(33));
    for entry in uptime {
        println!("{:<22} {:>9.2}%", entry.datetime, entry.uptime_percentage);
    }
    Ok(())
}

pub fn print_downtime(periods: &[DowntimePeriod], json: bool) -> Result<()> {
    if json {
        return print_json(periods);
    }

    if periods.is_empty() {
        println!("✅ No downtime in this period");
        return Ok(());
    }

    println!("{:<22} {:<22}", "STARTED AT", "ENDED AT");
    println!("{}", "=".repeat(44));
    for period in periods {
        println!(
            "{:<22} {:<22}",
            period.started_at,
            period.ended_at.as_deref().unwrap_or("still down")
        );
    }
    Ok(())
}

pub fn print_certificate(health: &CertificateHealth, json: bool) -> Result<()> {
    if json {
        return print_json(health);
    }

    let details = &health.certificate_details;
    println!("🔒 Issuer: {}", details.issuer);
    println!("   Valid from: {}", details.valid_from);
    println!("   Valid until: {}", details.valid_until);
    println!();

    for check in &health.certificate_checks {
        let mark = if check.passed { "✅" } else { "❌" };
        println!("   {} {}", mark, check.label);
    }

    if !health.certificate_chain_issuers.is_empty() {
        println!();
        println!("   Chain: {}", health.certificate_chain_issuers.join(" → "));
    }

    println!();
    if health.all_checks_passed() {
        println!("📊 All certificate checks passed");
    } else {
        println!("📊 Some certificate checks failed");
    }
    Ok(())
}

// Shortens long URLs so the table columns stay aligned
fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let kept: String = value.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        value.to_string()
    }
}
