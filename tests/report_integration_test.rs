use clinic_report::domain::model::{ExclusionFilters, ReportRequest};
use clinic_report::{AttendancePipeline, EtlEngine, EtlError, LocalStorage, TomlConfig, TracingProgress};
use anyhow::Result;
use chrono::NaiveDate;
use httpmock::prelude::*;
use tempfile::TempDir;

fn config_for(server: &MockServer, output_path: &str) -> TomlConfig {
    let toml_content = format!(
        r#"
[portal]
base_url = "{}"
login = "operator"
password = "s3cret"
request_delay_ms = 0
timeout_seconds = 5

[load]
output_path = "{}"
"#,
        server.base_url(),
        output_path.replace('\\', "/")
    );
    TomlConfig::from_toml_str(&toml_content).unwrap()
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
}

fn detail_html(name: &str, specialty: &str, rows: &str) -> String {
    format!(
        r#"<html><body>
            <div class="cabecalho">
              <label>Médico: <strong id="retnomemedico">{}</strong></label>
              <label>{}</label>
            </div>
            <table id="tb_lista_dias">
              <thead><tr><th>Dia</th><th>Atendimentos</th></tr></thead>
              <tbody>{}</tbody>
            </table>
        </body></html>"#,
        name, specialty, rows
    )
}

fn mock_login(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST)
            .path("/Account/Login")
            .body_contains("login=operator");
        then.status(200).body("<html>menu</html>");
    })
}

#[tokio::test]
async fn test_single_day_report_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    let login_mock = mock_login(&server);
    let listing_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/Medico/ListaRelatorioAtendimentoMedico")
            .query_param("inicio", "2026-01-09")
            .query_param("fim", "2026-01-09")
            .query_param("unidade", "1")
            .query_param("dia", "true");
        then.status(200).body(
            r#"<table>
                 <tr><td><a href="/Medico/CentralPagamento?medId=1">Ana</a></td></tr>
                 <tr><td><a href="/Medico/CentralPagamento?medId=2">Bruno</a></td></tr>
                 <tr><td><a href="/Medico/CentralPagamento?medId=1">Ana</a></td></tr>
               </table>"#,
        );
    });
    let ana_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/Medico/CentralPagamento")
            .query_param("medId", "1");
        then.status(200).body(detail_html(
            "Dr. Ana Souza",
            "Cardiologia",
            "<tr><td>09/01/2026 <strong>10</strong></td><td>08:00 - 12:00 <strong>8</strong></td></tr>\
             <tr><td>09/01/2026 <strong>5</strong></td><td>13:00 - 17:00 <strong>-</strong></td></tr>",
        ));
    });
    let bruno_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/Medico/CentralPagamento")
            .query_param("medId", "2");
        then.status(200).body(detail_html(
            "Dr. Bruno Lima",
            "Pediatria",
            "<tr><td>09/01/2026 <strong>7</strong></td><td>08:00 - 12:00 <strong>7</strong></td></tr>",
        ));
    });

    let config = config_for(&server, &output_path);
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = AttendancePipeline::new(storage, config).unwrap();
    let engine = EtlEngine::new(pipeline);

    let request = ReportRequest {
        start: date(9),
        end: date(9),
        facility_id: "1".to_string(),
        filters: ExclusionFilters::from_lists("bruno", ""),
    };
    let summary = engine.run(&request, &TracingProgress).await.unwrap();

    login_mock.assert();
    listing_mock.assert();
    ana_mock.assert_hits(1);
    bruno_mock.assert_hits(1);

    assert_eq!(summary.links_found, 2);
    assert_eq!(summary.physicians_included, 1);
    assert_eq!(summary.physicians_excluded, 1);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.totals.slots, 15);
    assert_eq!(summary.totals.attended, 8);

    let output_file = summary.output_path.unwrap();
    assert!(output_file.ends_with("Relatorio_20260109.csv"));

    let bytes = std::fs::read(&output_file).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let content = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines[0], "Report Title;Physician Attendance Report");
    assert!(lines[1].starts_with("Generated At;"));
    assert_eq!(lines[2], "Period;2026-01-09 to 2026-01-09");
    assert_eq!(lines[3], "Facility;1");
    assert_eq!(lines[4], ";;;;;;");
    assert_eq!(
        lines[5],
        "Date;Physician;Specialty;Work Hours;Slot Count;Attended Count;Efficiency%"
    );
    assert_eq!(lines[6], "2026-01-09;Dr. Ana Souza;Cardiologia;08:00 - 12:00;10;8;80.00%");
    assert_eq!(lines[7], "2026-01-09;Dr. Ana Souza;Cardiologia;13:00 - 17:00;5;0;0.00%");
    assert_eq!(lines[8], "2026-01-09;Subtotal;;;15;8;53.33%");
    assert_eq!(lines[9], ";;;;;;");
    assert_eq!(lines[10], "Grand Total;;;;15;8;53.33%");
    assert_eq!(lines.len(), 11);
    assert!(!content.contains("Bruno"));
}

#[tokio::test]
async fn test_multi_day_links_are_deduplicated() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_string_lossy().into_owned();
    let server = MockServer::start();

    mock_login(&server);
    let listing_mock = server.mock(|when, then| {
        when.method(GET).path("/Medico/ListaRelatorioAtendimentoMedico");
        then.status(200)
            .body(r#"<a href="/Medico/CentralPagamento?medId=1">Ana</a>"#);
    });
    let ana_mock = server.mock(|when, then| {
        when.method(GET).path("/Medico/CentralPagamento");
        then.status(200).body(detail_html(
            "Dr. Ana Souza",
            "Cardiologia",
            "<tr><td>10/01/2026 <strong>4</strong></td><td>08:00 - 12:00 <strong>2</strong></td></tr>\
             <tr><td>09/01/2026 <strong>6</strong></td><td>08:00 - 12:00 <strong>6</strong></td></tr>",
        ));
    });

    let config = config_for(&server, &output_path);
    let pipeline = AttendancePipeline::new(LocalStorage::new(output_path.clone()), config)?;
    let engine = EtlEngine::new(pipeline);

    let request = ReportRequest {
        start: date(9),
        end: date(11),
        facility_id: "1".to_string(),
        filters: ExclusionFilters::default(),
    };
    let summary = engine.run(&request, &TracingProgress).await?;

    listing_mock.assert_hits(3);
    ana_mock.assert_hits(1);
    assert_eq!(summary.links_found, 1);

    let output_file = summary
        .output_path
        .ok_or_else(|| anyhow::anyhow!("Run wrote no report"))?;
    assert!(output_file.ends_with("Relatorio_20260109_to_20260111.csv"));

    let content = std::fs::read_to_string(&output_file)?;
    let first_day = content.find("2026-01-09;Subtotal;;;6;6;100.00%").unwrap();
    let second_day = content.find("2026-01-10;Subtotal;;;4;2;50.00%").unwrap();
    assert!(first_day < second_day);
    assert!(content.contains("Grand Total;;;;10;8;80.00%"));
    Ok(())
}

#[tokio::test]
async fn test_empty_period_writes_no_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    mock_login(&server);
    server.mock(|when, then| {
        when.method(GET).path("/Medico/ListaRelatorioAtendimentoMedico");
        then.status(200).body("<p>Nenhum registro encontrado</p>");
    });

    let config = config_for(&server, &output_path);
    let pipeline = AttendancePipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();
    let engine = EtlEngine::new(pipeline);

    let request = ReportRequest {
        start: date(9),
        end: date(9),
        facility_id: "1".to_string(),
        filters: ExclusionFilters::default(),
    };
    let summary = engine.run(&request, &TracingProgress).await.unwrap();

    assert!(summary.output_path.is_none());
    assert_eq!(summary.records, 0);
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_detail_failure_aborts_without_output() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    mock_login(&server);
    server.mock(|when, then| {
        when.method(GET).path("/Medico/ListaRelatorioAtendimentoMedico");
        then.status(200)
            .body(r#"<a href="/Medico/CentralPagamento?medId=1">Ana</a>"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/Medico/CentralPagamento");
        then.status(500);
    });

    let config = config_for(&server, &output_path);
    let pipeline = AttendancePipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();
    let engine = EtlEngine::new(pipeline);

    let request = ReportRequest {
        start: date(9),
        end: date(9),
        facility_id: "1".to_string(),
        filters: ExclusionFilters::default(),
    };
    let result = engine.run(&request, &TracingProgress).await;

    assert!(matches!(result, Err(EtlError::HttpError(_))));
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}
