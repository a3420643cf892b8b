//! Column names and category vocabulary of the GNV survey file.

use super::model::CellValue;

pub const ZONE: &str = "Zona";
pub const ADOPTION_PROFILE: &str = "Perfil_Adopción";
pub const DAILY_CONSUMPTION: &str = "Consumo_Diario_Lts";
pub const GNV_KNOWLEDGE: &str = "Conocimiento_GNV";
pub const GNV_WILLINGNESS: &str = "Disposición_GNV";
pub const DOMINANT_FEAR: &str = "Miedo_GNV";
pub const UNIT_TYPE: &str = "Tipo de unidad";
pub const FUEL_TYPE: &str = "Combustible";
pub const BRAND: &str = "Marca";
pub const AGE: &str = "Edad";
pub const VEHICLE_YEAR: &str = "Año_Vehículo";

/// Every column of the survey, in canonical file order.
pub const COLUMNS: [&str; 11] = [
    ZONE,
    ADOPTION_PROFILE,
    DAILY_CONSUMPTION,
    GNV_KNOWLEDGE,
    GNV_WILLINGNESS,
    DOMINANT_FEAR,
    UNIT_TYPE,
    FUEL_TYPE,
    BRAND,
    AGE,
    VEHICLE_YEAR,
];

/// Categorical columns offered as sidebar filters when the config names none.
pub const DEFAULT_FILTER_COLUMNS: [&str; 5] = [ZONE, ADOPTION_PROFILE, UNIT_TYPE, FUEL_TYPE, BRAND];

fn normalized(value: &CellValue) -> Option<String> {
    value.as_str().map(|s| s.trim().to_lowercase())
}

/// "Sí" / "Si" / "Yes" / `true`.
pub fn is_affirmative(value: &CellValue) -> bool {
    match value {
        CellValue::Bool(b) => *b,
        other => matches!(
            normalized(other).as_deref(),
            Some("sí" | "si" | "yes" | "y" | "true")
        ),
    }
}

pub fn is_visionary(value: &CellValue) -> bool {
    matches!(
        normalized(value).as_deref(),
        Some("visionario" | "visionaria" | "visionary")
    )
}

/// Medium or high GNV knowledge ("Medio" / "Alto").
pub fn knows_gnv(value: &CellValue) -> bool {
    matches!(
        normalized(value).as_deref(),
        Some("medio" | "alto" | "medium" | "high")
    )
}
