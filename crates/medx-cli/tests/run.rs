//! End-to-end runs over CSV fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use medx_cli::run::{RunOptions, check_config, run_extract};
use medx_config::StrategyKind;
use tempfile::TempDir;

const EXTRACT: &str = "\u{feff}Numero_Documento_Paciente,Genero,Edad_Reg,Codigo_Item,Tipo_Diagnostico,Valor_Lab,Fecha_Atencion,Perimetro_Abdominal
30,F,44,Z019,D,,15/03/2024,95
10,M,58,99209.04,D,,2024-03-02,101
10,M,58,Z019,D,,2024-03-02,101
20,F,37,Z019,D,,2024-03-05,
30,F,44,99209.04,D,,15/03/2024,95
30,F,44,Z019,R,,16/03/2024,95
40,X,50,Z019,D,,2024-03-07,90
40,X,50,99209.04,D,,2024-03-07,90
,M,61,Z019,D,,2024-03-08,100
";

fn perimeter_config(dir: &Path, unique: bool) -> PathBuf {
    let config = format!(
        r#"
columnas = ["Numero_Documento_Paciente", "Genero", "Edad_Reg", "Codigo_Item",
            "Fecha_Atencion", "Perimetro_Abdominal"]

[configuracion]
tipo_diagnostico = "D"
archivo_entrada = "{input}"
archivo_salida = "{output}"
generar_nombre_unico = {unique}

[filtro_perimetro]
activo = true
codigos_requeridos = ["Z019", 99209.04]
modo_filtrado = "todos"
"#,
        input = dir.join("atenciones.csv").display(),
        output = dir.join("out").join("perimetro.csv").display(),
    );
    let path = dir.join("config.toml");
    fs::write(&path, config).unwrap();
    fs::write(dir.join("atenciones.csv"), EXTRACT).unwrap();
    path
}

fn options(config: PathBuf) -> RunOptions {
    RunOptions {
        config,
        input: None,
        output: None,
        dry_run: false,
    }
}

#[test]
fn perimeter_run_writes_classified_csv() {
    let dir = TempDir::new().unwrap();
    let config = perimeter_config(dir.path(), false);

    let report = run_extract(&options(config)).unwrap();

    let written = report.written.as_ref().unwrap();
    assert_eq!(written.path, dir.path().join("out").join("perimetro.csv"));
    assert_eq!(report.outcome.input_rows, 9);
    assert_eq!(report.unique_patients, 2);
    assert_eq!(report.outcome.strategy.strategy, StrategyKind::Perimeter);

    let content = fs::read_to_string(&written.path).unwrap();
    insta::assert_snapshot!(content, @r"
    Numero_Documento_Paciente,Genero,Edad_Reg,Codigo_Item,Fecha_Atencion,Perimetro_Abdominal,Clasificacion_Perimetro
    10,M,58,99209.04,2024-03-02,101,NORMAL
    10,M,58,Z019,2024-03-02,101,NORMAL
    30,F,44,Z019,2024-03-15,95,ANORMAL
    30,F,44,99209.04,2024-03-15,95,ANORMAL
    ");
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = perimeter_config(dir.path(), true);

    let report = run_extract(&RunOptions {
        dry_run: true,
        ..options(config)
    })
    .unwrap();

    assert!(report.written.is_none());
    assert!(!dir.path().join("out").exists());
    let name = report.output_path.file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("perimetro_"));
    assert!(name.ends_with(".csv"));
}

#[test]
fn missing_configured_column_keeps_previous_output() {
    let dir = TempDir::new().unwrap();
    let config = perimeter_config(dir.path(), false);
    let out_dir = dir.path().join("out");
    fs::create_dir_all(&out_dir).unwrap();
    fs::write(out_dir.join("perimetro.csv"), "previous\n").unwrap();

    let narrow = dir.path().join("narrow.csv");
    fs::write(
        &narrow,
        "Numero_Documento_Paciente,Codigo_Item,Tipo_Diagnostico\n1,Z019,D\n",
    )
    .unwrap();

    let error = run_extract(&RunOptions {
        input: Some(narrow),
        ..options(config)
    })
    .unwrap_err();

    let message = format!("{error:#}");
    assert!(message.contains("Genero"), "{message}");
    assert_eq!(
        fs::read_to_string(out_dir.join("perimetro.csv")).unwrap(),
        "previous\n"
    );
}

#[test]
fn header_only_extract_writes_header_only_output() {
    let dir = TempDir::new().unwrap();
    let config = perimeter_config(dir.path(), false);
    let header = EXTRACT.lines().next().unwrap();
    let empty = dir.path().join("empty.csv");
    fs::write(&empty, format!("{header}\n")).unwrap();

    let report = run_extract(&RunOptions {
        input: Some(empty),
        ..options(config)
    })
    .unwrap();

    assert_eq!(report.outcome.input_rows, 0);
    assert_eq!(report.unique_patients, 0);
    assert_eq!(report.date_span, None);
    let written = report.written.as_ref().unwrap();
    assert_eq!(written.rows, 0);
    let content = fs::read_to_string(&written.path).unwrap();
    assert_eq!(
        content.trim_end(),
        "Numero_Documento_Paciente,Genero,Edad_Reg,Codigo_Item,Fecha_Atencion,Perimetro_Abdominal,Clasificacion_Perimetro"
    );
}

#[test]
fn check_reports_active_strategy() {
    let dir = TempDir::new().unwrap();
    let config = perimeter_config(dir.path(), true);

    let report = check_config(&config).unwrap();

    assert_eq!(report.active, StrategyKind::Perimeter);
    assert_eq!(report.enabled, vec![StrategyKind::Perimeter]);
    assert!(report.input.is_some());
}

#[test]
fn missing_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let error = check_config(&dir.path().join("absent.toml")).unwrap_err();
    assert!(format!("{error:#}").contains("absent.toml"));
}
