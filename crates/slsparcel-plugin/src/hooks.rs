//! Lifecycle hooks the plugin registers with the host.

use std::fmt;
use std::str::FromStr;

use slsparcel_core::PackError;

/// Which half of the cycle a hook drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Resolve, bundle, redirect the service path.
    Bundle,
    /// Relocate artifacts, restore the service path, remove the build folder.
    Cleanup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    BeforePackage,
    AfterPackage,
    BeforeFunctionPackage,
    AfterFunctionPackage,
}

impl LifecycleHook {
    pub const ALL: [LifecycleHook; 4] = [
        LifecycleHook::BeforePackage,
        LifecycleHook::AfterPackage,
        LifecycleHook::BeforeFunctionPackage,
        LifecycleHook::AfterFunctionPackage,
    ];

    /// Host event name.
    pub fn event_name(self) -> &'static str {
        match self {
            LifecycleHook::BeforePackage => "before:package:createDeploymentArtifacts",
            LifecycleHook::AfterPackage => "after:package:createDeploymentArtifacts",
            LifecycleHook::BeforeFunctionPackage => "before:deploy:function:packageFunction",
            LifecycleHook::AfterFunctionPackage => "after:deploy:function:packageFunction",
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            LifecycleHook::BeforePackage | LifecycleHook::BeforeFunctionPackage => Phase::Bundle,
            LifecycleHook::AfterPackage | LifecycleHook::AfterFunctionPackage => Phase::Cleanup,
        }
    }

    /// Fired by a single-function deploy rather than a full package.
    pub fn is_single_function(self) -> bool {
        matches!(
            self,
            LifecycleHook::BeforeFunctionPackage | LifecycleHook::AfterFunctionPackage
        )
    }
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

impl FromStr for LifecycleHook {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LifecycleHook::ALL
            .into_iter()
            .find(|h| h.event_name() == s)
            .ok_or_else(|| PackError::Cycle(format!("unknown lifecycle hook '{}'", s)))
    }
}
