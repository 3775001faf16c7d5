//! List types command implementation.

use implicit_libs_core::{ProjectTag, ProjectType};

/// Runs the list-types command.
pub fn run() {
    println!("Allowed project types:\n");
    println!("{:<10} {:<15} Example folder", "Type", "Tag");
    println!("{}", "-".repeat(50));

    for project_type in ProjectType::ALL {
        println!(
            "{:<10} {:<15} libs/<platform>/<scope>/<name>-{}",
            project_type.as_str(),
            ProjectTag::Type(project_type).to_string(),
            project_type
        );
    }

    println!("\nEvery library is also tagged with platform:<platform> and scope:<scope>.");
    println!("\nThe name part is optional, e.g.:");
    println!("  libs/web/catalog/ui         -> web-catalog-ui");
    println!("  libs/web/catalog/search-ui  -> web-catalog-search-ui");
}
