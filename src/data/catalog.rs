// ---------------------------------------------------------------------------
// Fixed option lists offered by the dashboard
// ---------------------------------------------------------------------------

/// Year span covered by the published dataset.
pub const DEFAULT_YEAR_RANGE: (i32, i32) = (2017, 2024);

/// Weapon / means categories (`ARMA MEDIO`).
pub const WEAPON_TYPES: [&str; 8] = [
    "ARMA DE FUEGO",
    "ARMA BLANCA / CORTOPUNZANTE",
    "CONTUNDENTES",
    "ARTEFACTO EXPLOSIVO/CARGA DINAMITA",
    "CUERDA/SOGA/CADENA",
    "SIN EMPLEO DE ARMAS",
    "ALMOHADA",
    "MINA ANTIPERSONA",
];

/// Weapon types selected when a dataset is first opened.
pub const DEFAULT_WEAPON_TYPES: [&str; 3] =
    ["ARMA DE FUEGO", "ARMA BLANCA / CORTOPUNZANTE", "CONTUNDENTES"];

/// Municipalities (`MUNICIPIO`) with recorded incidents.
pub const MUNICIPALITIES: [&str; 24] = [
    "CARTAGENA (CT)",
    "EL CARMEN DE BOLÍVAR",
    "SAN PABLO",
    "MAGANGUÉ",
    "ARJONA",
    "TURBACO",
    "SANTA ROSA DEL SUR",
    "MARÍA LA BAJA",
    "SANTA ROSA",
    "SIMITÍ",
    "VILLANUEVA",
    "NOROSÍ",
    "MORALES",
    "SANTA CATALINA",
    "MOMPÓS",
    "MONTECRISTO",
    "SAN JACINTO",
    "MAHATES",
    "CANTAGALLO",
    "TIQUISIO",
    "BARRANCO DE LOBA",
    "CLEMENCIA",
    "ACHÍ",
    "CALAMAR",
];

/// Municipalities selected when a dataset is first opened.
pub const DEFAULT_MUNICIPALITIES: [&str; 3] = ["CARTAGENA (CT)", "MAGANGUÉ", "TURBACO"];

/// Gender values (`GENERO`) offered in the selector besides "both".
pub const GENDERS: [&str; 2] = ["MASCULINO", "FEMENINO"];

/// Label of the "no gender filter" choice.
pub const BOTH_GENDERS_LABEL: &str = "Ambos";

/// Merge a fixed option list with the values actually present in a dataset.
///
/// Catalog entries come first in catalog order, followed by any extra values
/// found in the data (sorted), so unexpected categories remain selectable.
pub fn options_with_extras<'a>(
    catalog: &[&str],
    present: impl IntoIterator<Item = &'a String>,
) -> Vec<String> {
    let mut options: Vec<String> = catalog.iter().map(|s| s.to_string()).collect();
    let mut extras: Vec<String> = present
        .into_iter()
        .filter(|v| !catalog.contains(&v.as_str()))
        .cloned()
        .collect();
    extras.sort();
    extras.dedup();
    options.extend(extras);
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_part_of_the_catalog() {
        for w in DEFAULT_WEAPON_TYPES {
            assert!(WEAPON_TYPES.contains(&w));
        }
        for m in DEFAULT_MUNICIPALITIES {
            assert!(MUNICIPALITIES.contains(&m));
        }
    }

    #[test]
    fn extras_are_appended_after_catalog_entries() {
        let present = vec![
            "ZAMBRANO".to_string(),
            "ARJONA".to_string(),
            "CÓRDOBA".to_string(),
        ];
        let options = options_with_extras(&MUNICIPALITIES, &present);

        assert_eq!(options.len(), MUNICIPALITIES.len() + 2);
        assert_eq!(options[0], "CARTAGENA (CT)");
        assert_eq!(&options[MUNICIPALITIES.len()..], ["CÓRDOBA", "ZAMBRANO"]);
    }
}
