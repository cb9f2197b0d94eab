//! Project files shared by the unit tests.

use std::fs;
use std::path::{Path, PathBuf};

/// An Xcode-written project with an app target, a test target and an
/// aggregate target. It already contains `Sources/App.swift` and
/// `Sources/Model/User.swift`.
pub const DEMO_PBXPROJ: &str = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	classes = {
	};
	objectVersion = 56;
	objects = {

/* Begin PBXAggregateTarget section */
		A10000000000000000000001 /* Lint */ = {
			isa = PBXAggregateTarget;
			buildConfigurationList = A10000000000000000000002 /* Build configuration list for PBXAggregateTarget "Lint" */;
			buildPhases = (
			);
			dependencies = (
			);
			name = Lint;
			productName = Lint;
		};
/* End PBXAggregateTarget section */

/* Begin PBXBuildFile section */
		B10000000000000000000001 /* App.swift in Sources */ = {isa = PBXBuildFile; fileRef = F10000000000000000000001 /* App.swift */; };
		B10000000000000000000002 /* User.swift in Sources */ = {isa = PBXBuildFile; fileRef = F10000000000000000000002 /* User.swift */; };
		B10000000000000000000003 /* User.swift in Sources */ = {isa = PBXBuildFile; fileRef = F10000000000000000000002 /* User.swift */; };
/* End PBXBuildFile section */

/* Begin PBXFileReference section */
		F10000000000000000000001 /* App.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = App.swift; sourceTree = "<group>"; };
		F10000000000000000000002 /* User.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = User.swift; sourceTree = "<group>"; };
		F10000000000000000000003 /* Demo.app */ = {isa = PBXFileReference; explicitFileType = wrapper.application; includeInIndex = 0; path = Demo.app; sourceTree = BUILT_PRODUCTS_DIR; };
/* End PBXFileReference section */

/* Begin PBXGroup section */
		G10000000000000000000001 = {
			isa = PBXGroup;
			children = (
				G10000000000000000000002 /* Sources */,
				G10000000000000000000004 /* Products */,
			);
			sourceTree = "<group>";
		};
		G10000000000000000000002 /* Sources */ = {
			isa = PBXGroup;
			children = (
				F10000000000000000000001 /* App.swift */,
				G10000000000000000000003 /* Model */,
			);
			path = Sources;
			sourceTree = "<group>";
		};
		G10000000000000000000003 /* Model */ = {
			isa = PBXGroup;
			children = (
				F10000000000000000000002 /* User.swift */,
			);
			path = Model;
			sourceTree = "<group>";
		};
		G10000000000000000000004 /* Products */ = {
			isa = PBXGroup;
			children = (
				F10000000000000000000003 /* Demo.app */,
			);
			name = Products;
			sourceTree = "<group>";
		};
/* End PBXGroup section */

/* Begin PBXNativeTarget section */
		T10000000000000000000001 /* Demo */ = {
			isa = PBXNativeTarget;
			buildConfigurationList = C10000000000000000000003 /* Build configuration list for PBXNativeTarget "Demo" */;
			buildPhases = (
				S10000000000000000000001 /* Sources */,
			);
			buildRules = (
			);
			dependencies = (
			);
			name = Demo;
			productName = Demo;
			productReference = F10000000000000000000003 /* Demo.app */;
			productType = "com.apple.product-type.application";
		};
		T10000000000000000000002 /* DemoTests */ = {
			isa = PBXNativeTarget;
			buildConfigurationList = C10000000000000000000004 /* Build configuration list for PBXNativeTarget "DemoTests" */;
			buildPhases = (
				S10000000000000000000002 /* Sources */,
			);
			buildRules = (
			);
			dependencies = (
			);
			name = DemoTests;
			productName = DemoTests;
			productType = "com.apple.product-type.bundle.unit-test";
		};
/* End PBXNativeTarget section */

/* Begin PBXProject section */
		P10000000000000000000001 /* Project object */ = {
			isa = PBXProject;
			buildConfigurationList = C10000000000000000000001 /* Build configuration list for PBXProject "Demo" */;
			compatibilityVersion = "Xcode 14.0";
			developmentRegion = en;
			hasScannedForEncodings = 0;
			knownRegions = (
				en,
				Base,
			);
			mainGroup = G10000000000000000000001;
			productRefGroup = G10000000000000000000004 /* Products */;
			projectDirPath = "";
			projectRoot = "";
			targets = (
				T10000000000000000000001 /* Demo */,
				T10000000000000000000002 /* DemoTests */,
				A10000000000000000000001 /* Lint */,
			);
		};
/* End PBXProject section */

/* Begin PBXSourcesBuildPhase section */
		S10000000000000000000001 /* Sources */ = {
			isa = PBXSourcesBuildPhase;
			buildActionMask = 2147483647;
			files = (
				B10000000000000000000001 /* App.swift in Sources */,
				B10000000000000000000002 /* User.swift in Sources */,
			);
			runOnlyForDeploymentPostprocessing = 0;
		};
		S10000000000000000000002 /* Sources */ = {
			isa = PBXSourcesBuildPhase;
			buildActionMask = 2147483647;
			files = (
				B10000000000000000000003 /* User.swift in Sources */,
			);
			runOnlyForDeploymentPostprocessing = 0;
		};
/* End PBXSourcesBuildPhase section */

/* Begin XCBuildConfiguration section */
		C10000000000000000000005 /* Debug */ = {
			isa = XCBuildConfiguration;
			buildSettings = {
				SWIFT_VERSION = 5.0;
			};
			name = Debug;
		};
		C10000000000000000000006 /* Debug */ = {
			isa = XCBuildConfiguration;
			buildSettings = {
				PRODUCT_NAME = "$(TARGET_NAME)";
			};
			name = Debug;
		};
		C10000000000000000000007 /* Debug */ = {
			isa = XCBuildConfiguration;
			buildSettings = {
				PRODUCT_NAME = "$(TARGET_NAME)";
			};
			name = Debug;
		};
		C10000000000000000000008 /* Debug */ = {
			isa = XCBuildConfiguration;
			buildSettings = {
				PRODUCT_NAME = "$(TARGET_NAME)";
			};
			name = Debug;
		};
/* End XCBuildConfiguration section */

/* Begin XCConfigurationList section */
		A10000000000000000000002 /* Build configuration list for PBXAggregateTarget "Lint" */ = {
			isa = XCConfigurationList;
			buildConfigurations = (
				C10000000000000000000008 /* Debug */,
			);
			defaultConfigurationIsVisible = 0;
			defaultConfigurationName = Debug;
		};
		C10000000000000000000001 /* Build configuration list for PBXProject "Demo" */ = {
			isa = XCConfigurationList;
			buildConfigurations = (
				C10000000000000000000005 /* Debug */,
			);
			defaultConfigurationIsVisible = 0;
			defaultConfigurationName = Debug;
		};
		C10000000000000000000003 /* Build configuration list for PBXNativeTarget "Demo" */ = {
			isa = XCConfigurationList;
			buildConfigurations = (
				C10000000000000000000006 /* Debug */,
			);
			defaultConfigurationIsVisible = 0;
			defaultConfigurationName = Debug;
		};
		C10000000000000000000004 /* Build configuration list for PBXNativeTarget "DemoTests" */ = {
			isa = XCConfigurationList;
			buildConfigurations = (
				C10000000000000000000007 /* Debug */,
			);
			defaultConfigurationIsVisible = 0;
			defaultConfigurationName = Debug;
		};
/* End XCConfigurationList section */
	};
	rootObject = P10000000000000000000001 /* Project object */;
}
"#;

/// Write `Demo.xcodeproj/project.pbxproj` under `dir` and return the bundle path.
pub fn write_demo_project(dir: &Path) -> PathBuf {
    let bundle = dir.join("Demo.xcodeproj");
    fs::create_dir_all(&bundle).unwrap();
    fs::write(bundle.join("project.pbxproj"), DEMO_PBXPROJ).unwrap();
    bundle
}
