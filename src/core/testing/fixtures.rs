//! Captured native tool output used by adapter tests

use crate::core::ToolOutput;

/// `rpm -qa --qf '%{NAME},%{VERSION},%{SIZE}\n'`
pub const RPM_QA: &str = "base,1.0,12345\nchild,1.0,2048\ngrandchild,1.0,4096\n";

/// `rpm -qi base`
pub const RPM_QI_BASE: &str = "\
Name        : base
Version     : 1.0
Release     : 1
Architecture: x86_64
Install Date: Mon 06 Oct 2025 10:11:12 AM UTC
Group       : Unspecified
Size        : 12345
License     : MIT
Signature   : (none)
Source RPM  : base-1.0-1.src.rpm
Build Date  : Mon 06 Oct 2025 10:00:00 AM UTC
Build Host  : localhost
Summary     : Base test package
Description :
Base package used by the test suite.
Note: it has no files.
";

/// `rpm -q --changelog base`
pub const RPM_CHANGELOG_BASE: &str = "\
* Mon Oct 06 2025 Packager <packager@example.com> - 1.0-1
- second entry
* Sun Oct 05 2025 Packager <packager@example.com> - 0.9-1
- initial package
";

/// `zypper --xmlout -s 0 lr`
pub const ZYPPER_LR: &str = r#"<?xml version='1.0'?>
<stream>
<repo-list>
<repo alias="my-local-repo" name="My Local Repo" type="rpm-md" priority="99" enabled="1" autorefresh="1" gpgcheck="0" repo_gpgcheck="0" pkg_gpgcheck="0">
<url>dir:///tmp/my-local-repo</url>
</repo>
<repo alias="oss" name="Main Repository" type="rpm-md" priority="99" enabled="0" autorefresh="1" gpgcheck="1" repo_gpgcheck="1" pkg_gpgcheck="0">
<url>https://download.opensuse.org/tumbleweed/repo/oss/</url>
</repo>
</repo-list>
</stream>
"#;

/// `zypper --xmlout lr` with nothing configured; zypper exits 6 alongside it
pub const ZYPPER_LR_EMPTY: &str = r#"<?xml version='1.0'?>
<stream>
<message type="warning">No repositories defined.</message>
</stream>
"#;

/// `zypper --xmlout lr` on a fresh root, exit status included
#[must_use]
pub fn zypper_lr_no_repos() -> ToolOutput {
    ToolOutput {
        code: Some(6),
        stdout: ZYPPER_LR_EMPTY.to_string(),
        stderr: String::new(),
    }
}

/// `zypper --xmlout lp`
pub const ZYPPER_LP: &str = r#"<?xml version='1.0'?>
<stream>
<message type="info">Loading repository data...</message>
<update-status version="0.6">
<update-list>
<update kind="patch" name="openSUSE-SLE-15.6-2025-1234" edition="1" arch="noarch" status="needed" category="security" severity="important" pkgmanager="false" restart="false" interactive="false">
<summary>Security update for curl</summary>
</update>
</update-list>
</update-status>
<patch-list>
<patch name="openSUSE-2025-77" category="recommended" severity="moderate" status="needed"/>
</patch-list>
</stream>
"#;

/// `zypper --xmlout se -s base`
pub const ZYPPER_SE: &str = r#"<?xml version='1.0'?>
<stream>
<search-result version="0.0">
<solvable-list>
<solvable status="not-installed" name="base" kind="package" edition="1.0-1" arch="x86_64" repository="my-local-repo"/>
</solvable-list>
</search-result>
</stream>
"#;

/// `dpkg-query -W -f '${binary:Package},${Version},${Installed-Size}\n'`
pub const DPKG_QUERY_W: &str = "base-files,12.4+deb12u5,394\ndpkg,1.21.22,6500\nmystery,1.0,\n";

/// `dpkg-query -s dpkg`
pub const DPKG_STATUS: &str = "\
Package: dpkg
Essential: yes
Status: install ok installed
Priority: required
Section: admin
Installed-Size: 6500
Maintainer: Dpkg Developers <debian-dpkg@lists.debian.org>
Architecture: amd64
Version: 1.21.22
Depends: tar (>= 1.28-1)
Pre-Depends: libbz2-1.0, libc6 (>= 2.34), liblzma5 (>= 5.4.0)
Description: Debian package management system
 This package provides the low-level infrastructure for handling the
 installation and removal of Debian software packages.
";

/// `dnf repo info --all`
pub const DNF_REPO_INFO: &str = "\
Repo-id            : fedora
Repo-name          : Fedora 40 - x86_64
Repo-status        : enabled
Repo-revision      : 1713868558
Repo-baseurl       : https://dl.fedoraproject.org/pub/fedora/linux/releases/40/Everything/x86_64/os/

Repo-id            : updates-testing
Repo-name          : Fedora 40 - x86_64 - Test Updates
Repo-status        : disabled
Repo-metalink      : https://mirrors.fedoraproject.org/metalink?repo=updates-testing-f40&arch=x86_64
";

/// `dnf search base`
pub const DNF_SEARCH: &str = "\
Last metadata expiration check: 0:01:02 ago on Mon 06 Oct 2025 10:00:00 AM UTC.
======================== Name Exactly Matched: base ========================
base.x86_64 : Base test package
======================== Name & Summary Matched: base ========================
base-devel.x86_64 : Development files for base
base-doc.noarch : Documentation for base
";
