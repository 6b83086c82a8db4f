use lazy_static::lazy_static;

use super::TechConfig;

const SKY130_FILL_RULES_TOML: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tech/sky130/fill_rules.toml"
));

lazy_static! {
    static ref SKY130_FILL_RULES: TechConfig = TechConfig::from_toml(SKY130_FILL_RULES_TOML)
        .expect("failed to load sky130 fill rules");
}

pub fn tech_config() -> &'static TechConfig {
    &SKY130_FILL_RULES
}
