//! Built-in EPH ↔ Censo alignment tables.
//!
//! EPH is the household survey (INDEC's Encuesta Permanente de Hogares),
//! Censo the national census. Rules in EPH→Censo profiles use Censo names
//! because they run after the rename; Censo→EPH profiles also use Censo names
//! and run before it.

use harmonize_model::{
    Bounds, ClipSpec, CollapseMode, ComparisonOp, Condition, ConditionalRule, ConfigError,
    Crosswalk, FamilyGroup, LookupJoin, OverrideRule, RecodeMap, RecodeSpec,
};

use crate::profile::PipelineProfile;

/// Census names of the shared subset, paired by position with [`NAMES_EPH`].
pub const NAMES_CENSO: [&str; 24] = [
    "IX_TOT", "P02", "P03", "CONDACT", "AGLOMERADO", "V01", "H05", "H06", "H07", "H08", "H09",
    "H10", "H11", "H12", "H16", "H15", "PROP", "H14", "H13", "P07", "P08", "P09", "P10", "P05",
];

/// EPH names of the shared subset, paired by position with [`NAMES_CENSO`].
pub const NAMES_EPH: [&str; 24] = [
    "IX_TOT", "CH04", "CH06", "CONDACT", "AGLOMERADO", "IV1", "IV3", "IV4", "IV5", "IV6", "IV7",
    "IV8", "IV10", "IV11", "II1", "II2", "II7", "II8", "II9", "CH09", "CH10", "CH12", "CH13",
    "CH15",
];

/// Monetary columns cast to numbers when present.
pub const MONETARY_COLUMNS: [&str; 9] = [
    "P21", "P47T", "PP08D1", "TOT_P12", "T_VI", "V12_M", "V2_M", "V3_M", "V5_M",
];

/// Indicator families that arrive split as `{base}_{NN}_M` in recent EPH releases.
pub const MULTI_ANSWER_BASES: [&str; 5] = ["V2", "V5", "V11", "V21", "V22"];

pub fn eph_to_censo_crosswalk() -> Crosswalk {
    Crosswalk::from_pairs(NAMES_EPH.into_iter().zip(NAMES_CENSO))
}

pub fn censo_to_eph_crosswalk() -> Crosswalk {
    eph_to_censo_crosswalk().reversed()
}

/// Dwelling and household answer codes folded onto one code frame, keyed by
/// census name.
///
/// The household pipelines apply these in both directions: after the rename
/// going EPH→Censo, before it going Censo→EPH. `V01` folds several dwelling
/// types into "other" (6) and cannot be inverted.
pub fn household_recodes() -> RecodeSpec {
    RecodeSpec::new()
        .with(
            "V01",
            RecodeMap::from_pairs([(1, 1), (2, 6), (3, 6), (4, 2), (5, 3), (6, 4), (7, 5), (8, 6)]),
        )
        .with(
            "H06",
            RecodeMap::from_pairs([(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6), (7, 7), (8, 9)]),
        )
        .with(
            "H09",
            RecodeMap::from_pairs([(1, 1), (2, 2), (3, 3), (4, 4), (5, 4), (6, 4)]),
        )
        .with(
            "H14",
            RecodeMap::from_pairs([(1, 1), (2, 4), (3, 2), (4, 2), (5, 4), (6, 3), (7, 4), (8, 9)]),
        )
        .with("H13", RecodeMap::from_pairs([(1, 1), (2, 2), (4, 0)]))
}

/// Census answer codes mapped onto EPH code frames: [`household_recodes`]
/// plus the sex code `P07`.
pub fn censo_to_eph_recodes() -> RecodeSpec {
    household_recodes().with("P07", RecodeMap::from_pairs([(1, 1), (2, 2), (0, 2)]))
}

fn censo_clip() -> ClipSpec {
    ClipSpec::new().with("H16", Bounds::between(0.0, 9.0))
}

fn region_lookup() -> LookupJoin {
    LookupJoin::new("DPTO", "Region")
}

fn region_overrides() -> Vec<OverrideRule> {
    vec![
        OverrideRule::new()
            .matching("AGLOMERADO", 33)
            .matching("Region", "Pampeana")
            .set("Region", "Gran Buenos Aires"),
        OverrideRule::new()
            .matching("AGLOMERADO", 93)
            .matching("Region", "Pampeana")
            .set("Region", "Patagónica"),
    ]
}

fn monetary() -> Vec<String> {
    names(&MONETARY_COLUMNS)
}

fn names(columns: &[&str]) -> Vec<String> {
    columns.iter().copied().map(str::to_string).collect()
}

fn multi_answer_families() -> Result<Vec<FamilyGroup>, ConfigError> {
    MULTI_ANSWER_BASES
        .iter()
        .map(|base| {
            FamilyGroup::with_suffix_pattern(
                *base,
                format!("{base}_M"),
                CollapseMode::MultiAny,
                r"\d+_M",
            )
        })
        .collect()
}

fn minors_inactive() -> ConditionalRule {
    ConditionalRule::new(Condition::new("CH06", ComparisonOp::Lt, 14)).set("CONDACT", 0)
}

pub fn eph_to_censo_household() -> Result<PipelineProfile, ConfigError> {
    let mut families = ["V21", "V22", "V5", "V11"]
        .iter()
        .map(|prefix| FamilyGroup::new(*prefix, *prefix, CollapseMode::OneOf))
        .collect::<Result<Vec<_>, _>>()?;
    families.push(FamilyGroup::new("V2", "V2", CollapseMode::MultiAny)?);

    Ok(PipelineProfile {
        stage: "eph_to_censo_household".to_string(),
        filters: vec![Condition::new("IV1", ComparisonOp::Ne, 9)],
        crosswalk: eph_to_censo_crosswalk(),
        families,
        recode: household_recodes(),
        clip: ClipSpec::new().with("IX_TOT", Bounds::between(0.0, 8.0)),
        lookup: Some(region_lookup()),
        overrides: region_overrides(),
        required: names(&["IX_TOT", "P02", "P03", "CONDACT", "AGLOMERADO"]),
        ..PipelineProfile::default()
    })
}

pub fn eph_to_censo_individual() -> Result<PipelineProfile, ConfigError> {
    let unknown_level = ConditionalRule::new(Condition::new("CH12", ComparisonOp::Eq, 99))
        .set("CH12", 0)
        .requires("CH13");
    let attending_early_school =
        ConditionalRule::new(Condition::new("CH12", ComparisonOp::In, vec![0, 1, 9]))
            .set("CH13", 0)
            .requires("CH13");

    Ok(PipelineProfile {
        stage: "eph_to_censo_individual".to_string(),
        enrich_requires_key: true,
        crosswalk: Crosswalk::from_pairs([("ESTADO", "CONDACT")]),
        families: multi_answer_families()?,
        recode: RecodeSpec::new()
            .with(
                "CH15",
                RecodeMap::from_pairs([(1, 1), (2, 1), (3, 1), (4, 2), (5, 2), (9, 0)]),
            )
            .with("CH09", RecodeMap::from_pairs([(1, 1), (2, 2), (0, 2), (3, 2)])),
        clip: ClipSpec::new().with("CH06", Bounds::at_least(0.0)),
        conditionals: vec![minors_inactive(), unknown_level, attending_early_school],
        lookup: Some(region_lookup()),
        overrides: region_overrides(),
        numeric: monetary(),
        required: names(&["CODUSU", "CH06", "CH09", "CONDACT"]),
        ..PipelineProfile::default()
    })
}

pub fn censo_to_eph_household() -> Result<PipelineProfile, ConfigError> {
    Ok(PipelineProfile {
        stage: "censo_to_eph_household".to_string(),
        crosswalk: censo_to_eph_crosswalk(),
        recode: censo_to_eph_recodes(),
        clip: censo_clip(),
        lookup: Some(region_lookup()),
        overrides: region_overrides(),
        numeric: monetary(),
        required: names(&["IX_TOT", "CH04", "CH06", "CONDACT", "AGLOMERADO"]),
        ..PipelineProfile::default()
    })
}

pub fn censo_to_eph_individual() -> Result<PipelineProfile, ConfigError> {
    Ok(PipelineProfile {
        stage: "censo_to_eph_individual".to_string(),
        enrich_requires_key: true,
        crosswalk: censo_to_eph_crosswalk(),
        families: multi_answer_families()?,
        recode: censo_to_eph_recodes(),
        clip: censo_clip(),
        conditionals: vec![minors_inactive()],
        lookup: Some(region_lookup()),
        overrides: region_overrides(),
        numeric: monetary(),
        required: names(&["CH04", "CH06", "CONDACT", "AGLOMERADO"]),
        ..PipelineProfile::default()
    })
}
