use crate::model::{Function, FunctionDescriptor, ParameterDescriptor};

/// Project member functions into descriptors, one per input, in order.
///
/// Inherited and overridden functions pass through exactly as the analyzer
/// attached them.
pub fn project_functions(functions: &[Function]) -> Vec<FunctionDescriptor> {
    functions.iter().map(project_function).collect()
}

pub fn project_function(function: &Function) -> FunctionDescriptor {
    FunctionDescriptor {
        id: function.id,
        name: function.name.clone(),
        visibility: function.visibility.to_string(),
        view: function.is_view,
        pure: function.is_pure,
        returns: function.return_types.clone(),
        parameters: function
            .parameters
            .iter()
            .map(|p| ParameterDescriptor {
                name: p.name.clone(),
                is_constant: p.is_constant,
                is_storage: p.is_storage_location,
                type_signature: p.type_signature.clone(),
            })
            .collect(),
        modifiers: function.modifier_names.clone(),
    }
}
