//! Plugin Registry

use crate::{FunctionPlugin, FunctionMeta};
use crate::EvalContext;
use spectra_core::{Value, SpectraError};
use std::collections::HashMap;
use std::sync::Arc;

/// Central plugin registry
pub struct PluginRegistry {
    functions: HashMap<String, Arc<dyn FunctionPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    pub fn with_function<F: FunctionPlugin + 'static>(mut self, f: F) -> Self {
        let name = f.meta().name.to_lowercase();
        self.functions.insert(name, Arc::new(f));
        self
    }

    pub fn get_function(&self, name: &str) -> Option<&dyn FunctionPlugin> {
        self.functions.get(&name.to_lowercase()).map(|f| f.as_ref())
    }

    pub fn call_function(&self, name: &str, args: &[Value], ctx: &EvalContext) -> Value {
        match self.get_function(name) {
            Some(f) => f.call(args, ctx),
            None => {
                // Find similar function names for better error message
                let similar = self.find_similar_functions(name);
                let mut err = SpectraError::undefined_func(name);
                if !similar.is_empty() {
                    let suggestions: Vec<&str> = similar.iter().take(5).map(|s| s.as_str()).collect();
                    err = err.with_suggestion(format!(
                        "Similar: {}. Use help() for full list.",
                        suggestions.join(", ")
                    ));
                }
                Value::Error(err)
            }
        }
    }

    /// Find function names similar to the given name (for error suggestions)
    fn find_similar_functions(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self.functions.keys()
            .filter_map(|func_name| {
                let score = Self::similarity_score(&name_lower, func_name);
                if score > 0 {
                    Some((func_name.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        // Higher score first, then alphabetical for stable output
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    /// Calculate similarity score between two strings
    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: std::collections::HashSet<char> = query.chars().collect();
        let candidate_chars: std::collections::HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();
        score += common * 2;

        let len_diff = (query.len() as i32 - candidate.len() as i32).unsigned_abs() as usize;
        if len_diff < 5 && score > 0 {
            score += 5 - len_diff;
        }

        score
    }

    pub fn help(&self, name: Option<&str>) -> Value {
        match name {
            Some(n) => self.help_for(n),
            None => self.general_help(),
        }
    }

    fn help_for(&self, name: &str) -> Value {
        match self.functions.get(&name.to_lowercase()) {
            Some(f) => Self::function_to_help(f.meta()),
            None => Value::Error(SpectraError::undefined_func(name)),
        }
    }

    fn general_help(&self) -> Value {
        let mut funcs_by_cat: HashMap<String, Vec<String>> = HashMap::new();
        for (name, f) in &self.functions {
            funcs_by_cat.entry(f.meta().category.to_string()).or_default().push(name.clone());
        }

        let functions = funcs_by_cat.into_iter()
            .map(|(cat, mut names)| {
                names.sort();
                (cat, Value::List(names.into_iter().map(Value::Text).collect()))
            })
            .collect();

        Value::object([
            ("functions", Value::Object(functions)),
            ("usage", Value::from("Call help('function_name') for detailed help.")),
        ])
    }

    fn function_to_help(meta: FunctionMeta) -> Value {
        let args = meta.args.iter()
            .map(|a| Value::object([
                ("name", Value::from(a.name)),
                ("type", Value::from(a.typ)),
                ("description", Value::from(a.description)),
                ("optional", Value::Bool(a.optional)),
            ]))
            .collect();

        Value::object([
            ("name", Value::from(meta.name)),
            ("description", Value::from(meta.description)),
            ("usage", Value::from(meta.usage)),
            ("returns", Value::from(meta.returns)),
            ("category", Value::from(meta.category)),
            ("args", Value::List(args)),
            ("examples", Value::List(meta.examples.iter().map(|e| Value::from(*e)).collect())),
            ("related", Value::List(meta.related.iter().map(|r| Value::from(*r)).collect())),
        ])
    }

    pub fn list_functions(&self, category: Option<&str>) -> Value {
        let mut metas: Vec<FunctionMeta> = self.functions.values()
            .map(|f| f.meta())
            .filter(|m| category.map_or(true, |c| m.category == c))
            .collect();
        metas.sort_by_key(|m| m.name);

        Value::List(metas.into_iter()
            .map(|meta| Value::object([
                ("name", Value::from(meta.name)),
                ("description", Value::from(meta.description)),
                ("usage", Value::from(meta.usage)),
                ("category", Value::from(meta.category)),
            ]))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArgMeta;
    use spectra_core::codes;

    struct TraceFn;

    static TRACE_ARGS: [ArgMeta; 1] = [ArgMeta::required("values", "List", "Diagonal entries")];

    impl FunctionPlugin for TraceFn {
        fn meta(&self) -> FunctionMeta {
            FunctionMeta {
                name: "trace",
                description: "Sum of a list",
                usage: "trace(values)",
                args: &TRACE_ARGS,
                returns: "Number",
                examples: &[],
                category: "test",
                related: &[],
            }
        }

        fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
            let sum: f64 = args.iter()
                .filter_map(|a| a.as_list())
                .flatten()
                .filter_map(|v| v.as_number())
                .sum();
            Value::Number(sum * ctx.config.free_parameter)
        }
    }

    fn ctx() -> EvalContext {
        EvalContext::new(Arc::new(PluginRegistry::new().with_function(TraceFn)))
    }

    #[test]
    fn test_call_registered_function() {
        let ctx = ctx();
        let result = ctx.call("TRACE", &[Value::from(vec![1.0, 2.0, 3.0])]);
        assert_eq!(result.as_number(), Some(6.0));
    }

    #[test]
    fn test_context_config_reaches_plugin() {
        let ctx = ctx().with_free_parameter(2.0);
        let result = ctx.call("trace", &[Value::from(vec![1.0, 2.0])]);
        assert_eq!(result.as_number(), Some(6.0));
    }

    #[test]
    fn test_unknown_function_suggests_similar() {
        let ctx = ctx();
        let result = ctx.call("trac", &[]);
        let err = result.as_error().unwrap();
        assert_eq!(err.code, codes::UNDEFINED_FUNC);
        assert!(err.suggestion.as_deref().unwrap_or("").contains("trace"));
    }

    #[test]
    fn test_help_and_listing() {
        let registry = PluginRegistry::new().with_function(TraceFn);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.help(Some("trace")).get("usage").as_text(), Some("trace(values)"));
        assert!(registry.help(Some("nope")).is_error());
        assert_eq!(registry.list_functions(Some("test")).as_list().map(|l| l.len()), Some(1));
        assert_eq!(registry.list_functions(Some("other")).as_list().map(|l| l.len()), Some(0));
        assert_eq!(TraceFn.meta().required_args(), 1);
    }
}
