use vergen_gitcl::{CargoBuilder, Emitter, GitclBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let cargo = CargoBuilder::all_cargo()?;
	let gitcl = GitclBuilder::all_git()?;

	Emitter::default().add_instructions(&cargo)?.add_instructions(&gitcl)?.emit()?;

	Ok(())
}
