// src/main.rs

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::error::Error;

// Response types
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ReportSummary {
    total_records: usize,
    late_records: usize,
    total_overtime_hours: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let base_url =
        std::env::var("ATTENDANCE_API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = Client::new();

    // Test 1: Health check
    println!("\n🔍 Testing health check endpoint...");
    let health_response = client
        .get(format!("{}/health", base_url))
        .send()
        .await?
        .json::<HealthResponse>()
        .await?;
    println!("Health check response: {:?}", health_response);

    // Test 2: Register an employee and a shift so generation picks them up
    println!("\n🔍 Registering employee and shift...");
    let employee_response = client
        .post(format!("{}/api/employees", base_url))
        .json(&json!({
            "Employee ID": "1234",
            "Name": "Test Employee",
            "Department": "Engineering",
            "Role": "Developer"
        }))
        .send()
        .await?;
    println!("Add employee status: {}", employee_response.status());

    let shift_response = client
        .post(format!("{}/api/shifts", base_url))
        .json(&json!({
            "Shift ID": "S1",
            "Shift Name": "Day",
            "Start Time": "09:00:00",
            "End Time": "17:00:00",
            "Assigned Employees": "Test Employee"
        }))
        .send()
        .await?;
    println!("Add shift status: {}", shift_response.status());

    // Test 3: Report over the default window
    println!("\n🔍 Testing report endpoint...");
    let report_response = client
        .get(format!("{}/api/report?count=50", base_url))
        .send()
        .await?;
    println!("Report status: {}", report_response.status());
    if report_response.status().is_success() {
        let summary = report_response.json::<ReportSummary>().await?;
        println!("Report summary: {:?}", summary);
    } else {
        println!("Failed to get report: {}", report_response.text().await?);
    }

    // Test 4: Filtered records
    println!("\n🔍 Testing filtered records endpoint...");
    let records_response = client
        .get(format!(
            "{}/api/records?department=Engineering&employee=12&count=50",
            base_url
        ))
        .send()
        .await?;
    println!("Records status: {}", records_response.status());
    let records: serde_json::Value = records_response.json().await?;
    println!(
        "Matching records: {}",
        records.as_array().map(|a| a.len()).unwrap_or(0)
    );

    // Test 5: Half-open date range must be rejected
    println!("\n🔍 Testing invalid filter handling...");
    let invalid_response = client
        .get(format!("{}/api/records?start=2024-01-01", base_url))
        .send()
        .await?;
    println!("Invalid filter status: {}", invalid_response.status());
    if !invalid_response.status().is_success() {
        let body = invalid_response.json::<ErrorBody>().await?;
        println!("Error message: {}", body.error);
    }

    // Test 6: CSV export
    println!("\n🔍 Testing CSV export...");
    let export_response = client
        .get(format!("{}/api/export.csv?count=10", base_url))
        .send()
        .await?;
    println!("Export status: {}", export_response.status());
    let csv_text = export_response.text().await?;
    for line in csv_text.lines().take(3) {
        println!("  {}", line);
    }

    println!("\n✅ Testing complete!");

    Ok(())
}
