use lambda_builder_core::{BuildOptions, Config};
use std::path::Path;

/// Print the builder and images a build of `working_directory` would use.
pub fn detect(working_directory: &Path) -> anyhow::Result<()> {
    let config = Config::resolve(BuildOptions {
        working_directory: working_directory.to_path_buf(),
        ..Default::default()
    })?;

    println!("Builder:     {}", config.builder);
    println!("Build image: {}", config.build_image);
    println!("Run image:   {}", config.run_image);
    println!("Image tag:   {}", config.image_tag());
    Ok(())
}
