//! Closed alias tables for recognising architectures, platforms, and file
//! extensions inside asset names.
//!
//! Each table member owns a fixed set of case-sensitive aliases. Resolving a
//! configured token is an exact match against any alias; matching an asset
//! name is a plain substring search. Because the search is not tokenised,
//! aliases must not be substrings of unrelated words: Windows deliberately
//! has no bare `win` alias, which would otherwise match every `darwin` asset.

use std::fmt;

/// Behaviour shared by every alias table.
pub trait NameMatcher: Copy + fmt::Debug + 'static {
    /// Filter type tag used in configuration, e.g. `arch`.
    const KIND: &'static str;

    /// Every member of the table, in resolution order.
    fn all() -> &'static [Self];

    /// Tokens that resolve to this member.
    fn aliases(self) -> &'static [&'static str];

    /// Substrings whose presence in an asset name selects this member.
    ///
    /// Defaults to [`Self::aliases`].
    fn patterns(self) -> &'static [&'static str] {
        self.aliases()
    }

    /// Resolve a configured token to a member by exact alias match.
    fn resolve(token: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|member| member.aliases().contains(&token))
    }

    /// Return whether `name` contains any of this member's patterns.
    fn contained_in(self, name: &str) -> bool {
        self.patterns().iter().any(|pattern| name.contains(pattern))
    }

    /// Comma-separated list of every accepted token, for error messages.
    fn expected_tokens() -> String {
        Self::all()
            .iter()
            .flat_map(|member| member.aliases().iter().copied())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// CPU architectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit x86.
    X86_64,
    /// 64-bit ARM.
    Arm64,
}

impl NameMatcher for Arch {
    const KIND: &'static str = "arch";

    fn all() -> &'static [Self] {
        &[Self::X86_64, Self::Arm64]
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::X86_64 => &["x86_64", "x86-64", "amd64"],
            Self::Arm64 => &["arm64", "aarch64"],
        }
    }
}

/// Operating system platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Linux.
    Linux,
    /// Microsoft Windows.
    Windows,
    /// Apple macOS.
    MacOs,
}

impl NameMatcher for Platform {
    const KIND: &'static str = "platform";

    fn all() -> &'static [Self] {
        &[Self::Linux, Self::Windows, Self::MacOs]
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Linux => &["linux"],
            Self::Windows => &["windows", "win32", "win64"],
            Self::MacOs => &["darwin", "macos", "mac-os"],
        }
    }
}

/// Packaging formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// Windows executables.
    Exe,
    /// Debian packages.
    Deb,
    /// RPM packages.
    Rpm,
    /// Gzipped tarballs.
    TarGz,
    /// Zip archives.
    Zip,
}

impl NameMatcher for Extension {
    const KIND: &'static str = "extension";

    fn all() -> &'static [Self] {
        &[Self::Exe, Self::Deb, Self::Rpm, Self::TarGz, Self::Zip]
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Exe => &["exe"],
            Self::Deb => &["deb"],
            Self::Rpm => &["rpm"],
            Self::TarGz => &["tar.gz", "tgz"],
            Self::Zip => &["zip"],
        }
    }

    // Matching on the dotted form keeps `deb` from selecting `debug` builds.
    fn patterns(self) -> &'static [&'static str] {
        match self {
            Self::Exe => &[".exe"],
            Self::Deb => &[".deb"],
            Self::Rpm => &[".rpm"],
            Self::TarGz => &[".tar.gz", ".tgz"],
            Self::Zip => &[".zip"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("x86_64", Arch::X86_64)]
    #[case("x86-64", Arch::X86_64)]
    #[case("amd64", Arch::X86_64)]
    #[case("arm64", Arch::Arm64)]
    #[case("aarch64", Arch::Arm64)]
    fn resolves_arch_aliases(#[case] token: &str, #[case] expected: Arch) {
        assert_eq!(Arch::resolve(token), Some(expected));
    }

    #[rstest]
    #[case("linux", Platform::Linux)]
    #[case("windows", Platform::Windows)]
    #[case("darwin", Platform::MacOs)]
    #[case("macos", Platform::MacOs)]
    fn resolves_platform_aliases(#[case] token: &str, #[case] expected: Platform) {
        assert_eq!(Platform::resolve(token), Some(expected));
    }

    #[rstest]
    #[case::case_sensitive("AMD64")]
    #[case::partial("x86")]
    #[case::unknown("riscv64")]
    fn arch_resolution_is_exact(#[case] token: &str) {
        assert_eq!(Arch::resolve(token), None);
    }

    #[test]
    fn darwin_asset_matches_macos_and_x86_64_only() {
        let name = "tool-darwin-amd64.tar.gz";
        assert!(Platform::MacOs.contained_in(name));
        assert!(Arch::X86_64.contained_in(name));
        assert!(!Platform::Windows.contained_in(name));
        assert!(!Platform::Linux.contained_in(name));
        assert!(!Arch::Arm64.contained_in(name));
    }

    #[test]
    fn no_platform_alias_is_a_substring_of_another_platforms_alias() {
        for member in Platform::all() {
            for other in Platform::all().iter().filter(|other| *other != member) {
                for alias in other.aliases() {
                    assert!(
                        !member.contained_in(alias),
                        "{member:?} unexpectedly matches {other:?} alias {alias}"
                    );
                }
            }
        }
    }

    #[rstest]
    #[case("tool-windows-amd64.exe", true)]
    #[case("tool_win64.zip", true)]
    #[case("tool-darwin-arm64", false)]
    #[case("winget-manifest.yaml", false)]
    fn windows_containment(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(Platform::Windows.contained_in(name), expected);
    }

    #[rstest]
    #[case(Extension::Deb, "tool_1.0_amd64.deb", true)]
    #[case(Extension::Deb, "tool-debug-linux", false)]
    #[case(Extension::TarGz, "tool.tgz", true)]
    #[case(Extension::Exe, "tool-windows-amd64.exe", true)]
    #[case(Extension::Zip, "tool-linux.tar.gz", false)]
    fn extension_containment(#[case] ext: Extension, #[case] name: &str, #[case] expected: bool) {
        assert_eq!(ext.contained_in(name), expected);
    }

    #[test]
    fn extension_resolves_undotted_tokens() {
        assert_eq!(Extension::resolve("tar.gz"), Some(Extension::TarGz));
        assert_eq!(Extension::resolve(".tar.gz"), None);
    }

    #[test]
    fn expected_tokens_lists_every_alias() {
        assert_eq!(Arch::expected_tokens(), "x86_64, x86-64, amd64, arm64, aarch64");
    }
}
