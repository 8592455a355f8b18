use crate::command::CommandDefinition;
use crate::flag::FlagDefinition;
use crate::lexer::Flags;

/// Returns the first required flag, in declaration order, that the line did
/// not supply under its name or alias, or supplied with an empty value.
pub fn missing_required<'a>(
    command: &'a CommandDefinition,
    flags: &Flags,
) -> Option<&'a FlagDefinition> {
    command.flags().filter(|f| f.required).find(|f| {
        !f.identifiers()
            .filter_map(|id| flags.get(id))
            .any(|value| !value.is_empty())
    })
}
