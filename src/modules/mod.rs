pub mod books;
pub mod list_items;

use shelf_kernel::ModuleRegistry;

use crate::AppDeps;

/// Register all feature modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, deps: &AppDeps) -> anyhow::Result<()> {
    registry.register(books::create_module(
        deps.books.clone(),
        deps.verifier.clone(),
    ))?;
    registry.register(list_items::create_module(
        deps.books.clone(),
        deps.list_items.clone(),
        deps.verifier.clone(),
    ))?;
    Ok(())
}
