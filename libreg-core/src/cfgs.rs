//! Single interface for registering all of the [`Config`]s for `libreg`.
//!
//! [`Config`]: libreg_cfg::Config

use libreg_cfg::ConfigSetBuilder;

use crate::build_env::STRICT_TOOLS;
use crate::defs::{MANIFEST_FILENAME, TOOL_SUFFIX};
use crate::engine::DEPS_ONLY;

pub fn all_cfgs(builder: &mut ConfigSetBuilder) {
    builder
        .register(&MANIFEST_FILENAME)
        .register(&TOOL_SUFFIX)
        .register(&DEPS_ONLY)
        .register(&STRICT_TOOLS);
}

#[cfg(test)]
mod tests {
    use libreg_cfg::ConfigSet;

    use super::*;

    #[test]
    fn smoketest_defaults() {
        let mut builder = ConfigSet::builder();
        all_cfgs(&mut builder);
        let configs = builder.build();

        assert_eq!(MANIFEST_FILENAME.read(&configs), "libreg.toml");
        assert_eq!(TOOL_SUFFIX.read(&configs), "Lib");
        assert!(!DEPS_ONLY.read(&configs));
        assert!(STRICT_TOOLS.read(&configs));
    }
}
