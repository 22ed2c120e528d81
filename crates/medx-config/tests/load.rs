use std::fs;
use std::path::Path;

use medx_config::{ConfigError, StrategyKind, load_config};
use tempfile::TempDir;

#[test]
fn loads_specific_filter_with_sub_filters() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
columnas = ["Numero_Documento_Paciente", "Codigo_Item", "Valor_Lab", "Fecha_Atencion", "Id_Correlativo"]

[configuracion]
tipo_diagnostico = "D"
archivo_entrada = "files/atenciones.csv"
archivo_salida = "output/presion.csv"
generar_nombre_unico = false

[filtro_especifico]
activo = true
tipo_diagnostico = ["D"]
codigo_item_especifico = "99199.22"
valor_lab_especifico = []

[filtro_especifico.rango_fechas]
activo = true
fecha_inicio = "2024-01-01"
fecha_fin = "2024-06-30"

[filtro_especifico.clasificacion_presion]
activo = true
tipos_permitidos = ["S"]
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.active_strategy(), StrategyKind::Specific);
    assert!(!config.general.unique_output_name);
    assert!(config.specific.lab_values.is_empty());
    assert_eq!(config.specific.date_range.start.as_deref(), Some("2024-01-01"));
    assert!(config.specific.blood_pressure.active);
    assert_eq!(config.specific.blood_pressure.allowed_types.as_slice(), &["S"]);
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}

#[test]
fn wrong_value_type_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "columnas = [\"A\"]\n[configuracion]\n[validaciones]\nedad_minima = \"cero\"\n",
    )
    .unwrap();
    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn example_configuration_loads_with_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/config.example.toml");
    let config = load_config(&path).unwrap();
    assert_eq!(config.active_strategy(), StrategyKind::GenericCodeLab);
    assert!(config.enabled_strategies().is_empty());
    assert_eq!(config.perimeter.thresholds.male.normal, 102.0);
    assert_eq!(config.clinical_risk.risk_codes.len(), 6);
    assert!(config.general.unique_output_name);
}
