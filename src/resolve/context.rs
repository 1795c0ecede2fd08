//! ResolutionContext: everything a node or component resolver may consult.
//!
//! The context owns the iteration scope, the diagnostics collected so far and
//! the state paths read since the last node was inserted. Every read made
//! through it is recorded, so dependency tracking never depends on component
//! resolvers remembering to report what they touched.

use crate::actions::{ActionContext, ActionResolverRegistry, ResolvedAction};
use crate::config::ResolverConfig;
use crate::document::action::ActionBinding;
use crate::document::data::{DataReference, DataSource};
use crate::document::node::Component;
use crate::document::value::StateValue;
use crate::document::Document;
use crate::expr::{self, Scope, ScopeEntry, ScopedReader, StateReader};
use crate::ir::{read_binding, ActionRef, BoundValue};
use crate::reactive::DependencyKind;
use crate::state::{StatePath, StateStore};
use crate::style::{
    FlatStyle, NodeOverrides, ResolvedStyle, StyleProperties, StyleResolutionError, StyleResolver,
};

use super::error::ResolutionError;

pub struct ResolutionContext<'a> {
    document: &'a Document,
    config: &'a ResolverConfig,
    state: &'a StateStore,
    actions: &'a ActionResolverRegistry,
    styles: StyleResolver<'a>,
    scope: Scope,
    depth: usize,
    pending: Vec<(StatePath, DependencyKind)>,
    diagnostics: Vec<ResolutionError>,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(
        document: &'a Document,
        state: &'a StateStore,
        actions: &'a ActionResolverRegistry,
        config: &'a ResolverConfig,
    ) -> Self {
        Self {
            document,
            config,
            state,
            actions,
            styles: StyleResolver::new(&document.styles)
                .with_max_depth(config.max_inheritance_depth),
            scope: Scope::new(),
            depth: 0,
            pending: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn config(&self) -> &'a ResolverConfig {
        self.config
    }

    pub fn state(&self) -> &'a StateStore {
        self.state
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn push_scope(&mut self, bindings: impl IntoIterator<Item = (String, ScopeEntry)>) {
        self.scope.push(bindings);
    }

    pub fn pop_scope(&mut self) {
        self.scope.pop();
    }

    /// Current node nesting.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn enter(&mut self) -> Result<(), ResolutionError> {
        if self.depth >= self.config.max_depth {
            return Err(ResolutionError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Diagnostics and dependencies
    // -----------------------------------------------------------------------

    /// Record a recoverable problem.
    pub fn diagnostic(&mut self, error: ResolutionError) {
        tracing::warn!(error = %error, "recoverable resolution error");
        self.diagnostics.push(error);
    }

    /// Add problems that were already logged where they were found.
    pub(crate) fn extend_diagnostics(&mut self, errors: impl IntoIterator<Item = ResolutionError>) {
        self.diagnostics.extend(errors);
    }

    pub fn diagnostics(&self) -> &[ResolutionError] {
        &self.diagnostics
    }

    pub(crate) fn into_diagnostics(self) -> Vec<ResolutionError> {
        self.diagnostics
    }

    /// Note that the node being built depends on `path`.
    pub fn record(&mut self, path: StatePath, kind: DependencyKind) {
        if self.config.track_dependencies {
            self.pending.push((path, kind));
        }
    }

    /// Dependencies recorded since the last call.
    pub(crate) fn take_pending(&mut self) -> Vec<(StatePath, DependencyKind)> {
        std::mem::take(&mut self.pending)
    }

    fn with_reader<T>(&mut self, read: impl FnOnce(&dyn StateReader) -> T) -> T {
        let (value, reads) = {
            let reader = ScopedReader::new(&self.scope, self.state);
            let value = read(&reader);
            (value, reader.take_reads())
        };
        for path in reads {
            self.record(path, DependencyKind::Value);
        }
        value
    }

    // -----------------------------------------------------------------------
    // Expressions and values
    // -----------------------------------------------------------------------

    pub fn evaluate(&mut self, expression: &str) -> StateValue {
        self.with_reader(|reader| expr::evaluate(expression, reader))
    }

    pub fn evaluate_condition(&mut self, expression: &str) -> bool {
        self.with_reader(|reader| expr::evaluate_condition(expression, reader))
    }

    pub fn interpolate(&mut self, template: &str) -> String {
        self.with_reader(|reader| expr::interpolate(template, reader))
    }

    /// Text that may hold `${...}` placeholders. Plain text stays literal.
    pub fn bound_text(&mut self, raw: &str) -> BoundValue {
        if !raw.contains("${") {
            return BoundValue::literal(raw);
        }
        let current = self.interpolate(raw);
        BoundValue::Template {
            template: raw.to_owned(),
            current,
            scope: self.scope.clone(),
        }
    }

    /// A live binding to `path`. Iteration variables are mapped onto the
    /// store location they were bound from; one with no location (an index)
    /// becomes a literal. Inside an iteration, helper calls and computed
    /// indices may name iteration variables, so they keep the scope as a
    /// one-placeholder template.
    pub fn bind_path(&mut self, path: &str) -> BoundValue {
        let path = path.trim();
        if !self.scope.is_empty() && path.contains('(') {
            return self.bound_text(&format!("${{{path}}}"));
        }
        let target = match StatePath::parse(path) {
            Ok(parsed) => match self.scope.lookup(&parsed) {
                Some(hit) => hit.source.map(|source| source.to_string()),
                None => Some(parsed.to_string()),
            },
            Err(_) if !self.scope.is_empty() => return self.bound_text(&format!("${{{path}}}")),
            Err(_) => Some(path.to_owned()),
        };
        let current = self.with_reader(|reader| read_binding(path, reader));
        match target {
            Some(path) => BoundValue::Binding { path, current },
            None => BoundValue::Literal(current),
        }
    }

    /// Resolve a data reference. An unknown data source is null.
    pub fn data(&mut self, reference: &DataReference) -> BoundValue {
        match reference {
            DataReference::Static { value } => BoundValue::Literal(value.clone()),
            DataReference::Binding {
                path: Some(path), ..
            } => self.bind_path(path),
            DataReference::Binding {
                path: None,
                template: Some(template),
            } => self.bound_text(template),
            DataReference::Binding {
                path: None,
                template: None,
            } => BoundValue::Literal(StateValue::Null),
            DataReference::Source { id } => match self.document.data_sources.get(id) {
                Some(DataSource::Static { value }) => BoundValue::Literal(value.clone()),
                Some(DataSource::Binding { path }) => self.bind_path(path),
                None => {
                    self.diagnostic(ResolutionError::UnknownDataSource(id.clone()));
                    BoundValue::Literal(StateValue::Null)
                }
            },
        }
    }

    /// A component's displayed content: `data` first, then `text`, then
    /// `label`. Empty text when none is set.
    pub fn content(&mut self, component: &Component) -> BoundValue {
        if let Some(data) = &component.data {
            return self.data(data);
        }
        match component.text.as_deref().or(component.label.as_deref()) {
            Some(text) => self.bound_text(text),
            None => BoundValue::literal(""),
        }
    }

    /// Items of the array at `path` and the store path they come from.
    /// Records a structural dependency on that path.
    pub fn array_at(&mut self, path: &str) -> (Vec<StateValue>, Option<StatePath>) {
        let path = path.trim();
        let (value, source) = match StatePath::parse(path) {
            Ok(parsed) => match self.scope.lookup(&parsed) {
                Some(hit) => (hit.value, hit.source),
                None => (self.state.get_path(&parsed).cloned(), Some(parsed)),
            },
            Err(_) => (Some(self.evaluate(path)), None),
        };
        if let Some(source) = &source {
            self.record(source.clone(), DependencyKind::Structure);
        }
        let items = match value {
            Some(StateValue::Array(items)) => items,
            Some(StateValue::Null) | None => Vec::new(),
            Some(other) => {
                tracing::debug!(path, kind = %other.kind(), "forEach items is not an array");
                Vec::new()
            }
        };
        (items, source)
    }

    // -----------------------------------------------------------------------
    // Styles
    // -----------------------------------------------------------------------

    /// Merge a style chain with inline overrides. A broken chain keeps only
    /// the inline properties.
    pub fn resolve_style(
        &mut self,
        style_id: Option<&str>,
        inline: Option<&StyleProperties>,
    ) -> ResolvedStyle {
        match self.styles.resolve(style_id, inline) {
            Ok(style) => style,
            Err(err) => {
                let error = match err {
                    StyleResolutionError::Unknown(id) => ResolutionError::UnknownStyle(id),
                    other => ResolutionError::Style(other),
                };
                self.diagnostic(error);
                inline.cloned().unwrap_or_default()
            }
        }
    }

    pub fn flat_style_with(
        &mut self,
        style_id: Option<&str>,
        inline: Option<&StyleProperties>,
        overrides: NodeOverrides<'_>,
    ) -> FlatStyle {
        let style = self.resolve_style(style_id, inline);
        FlatStyle::flatten(&style, overrides)
    }

    /// The component's flattened style, with its own padding and size
    /// winning over the style's.
    pub fn flat_style(&mut self, component: &Component) -> FlatStyle {
        self.flat_style_with(
            component.style_id.as_deref(),
            component.style.as_ref(),
            NodeOverrides {
                padding: component.padding.as_ref(),
                width: component.width,
                height: component.height,
                spacing: None,
            },
        )
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Resolve an event binding. References stay by name when the action
    /// table has them; anything broken becomes a no-op.
    pub fn action_ref(&mut self, binding: &ActionBinding) -> ActionRef {
        match binding {
            ActionBinding::Reference(id) if self.document.actions.contains_key(id) => {
                ActionRef::Named(id.clone())
            }
            ActionBinding::Reference(id) => {
                self.diagnostic(ResolutionError::UnknownAction(id.clone()));
                ActionRef::Inline(ResolvedAction::noop())
            }
            ActionBinding::Inline(action) => {
                let mut ctx = ActionContext::new(self.actions, &self.document.actions)
                    .with_max_depth(self.config.max_action_depth);
                match ctx.resolve(action) {
                    Ok(resolved) => ActionRef::Inline(resolved),
                    Err(source) => {
                        self.diagnostic(ResolutionError::Action {
                            action_id: action.kind.to_string(),
                            source,
                        });
                        ActionRef::Inline(ResolvedAction::noop())
                    }
                }
            }
        }
    }

    pub fn optional_action(&mut self, binding: Option<&ActionBinding>) -> Option<ActionRef> {
        binding.map(|binding| self.action_ref(binding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::action::Action;
    use crate::style::EdgeInsets;
    use pretty_assertions::assert_eq;

    fn document() -> Document {
        Document::from_json(
            r#"{
                "id": "ctx",
                "state": {"name": "Ada", "items": [{"title": "a"}, {"title": "b"}]},
                "styles": {
                    "base": {"fontSize": 14, "textColor": "gray"},
                    "title": {"inherits": "base", "fontSize": 24}
                },
                "dataSources": {
                    "fixed": {"type": "static", "value": 7},
                    "who": {"type": "binding", "path": "name"}
                },
                "actions": {"save": {"type": "noop"}},
                "root": {"children": []}
            }"#,
        )
        .unwrap()
    }

    fn state(document: &Document) -> StateStore {
        StateStore::with_values(document.state.clone())
    }

    #[test]
    fn reads_are_recorded_when_tracking() {
        let document = document();
        let state = state(&document);
        let actions = ActionResolverRegistry::with_defaults();
        let config = ResolverConfig::new().with_dependency_tracking(true);
        let mut ctx = ResolutionContext::new(&document, &state, &actions, &config);

        assert_eq!(ctx.bound_text("Hi ${name}").current().as_str(), Some("Hi Ada"));
        assert_eq!(
            ctx.take_pending(),
            vec![(StatePath::parse("name").unwrap(), DependencyKind::Value)]
        );
        assert!(ctx.take_pending().is_empty());
    }

    #[test]
    fn nothing_is_recorded_without_tracking() {
        let document = document();
        let state = state(&document);
        let actions = ActionResolverRegistry::with_defaults();
        let config = ResolverConfig::new();
        let mut ctx = ResolutionContext::new(&document, &state, &actions, &config);
        ctx.bind_path("name");
        assert!(ctx.take_pending().is_empty());
    }

    #[test]
    fn scoped_bindings_map_to_their_source() {
        let document = document();
        let state = state(&document);
        let actions = ActionResolverRegistry::with_defaults();
        let config = ResolverConfig::new();
        let mut ctx = ResolutionContext::new(&document, &state, &actions, &config);
        let (items, source) = ctx.array_at("items");
        assert_eq!(items.len(), 2);
        ctx.push_scope([
            (
                "item".to_owned(),
                ScopeEntry::new(items[1].clone(), source.map(|s| s.index(1))),
            ),
            ("i".to_owned(), ScopeEntry::new(StateValue::Int(1), None)),
        ]);

        assert_eq!(
            ctx.bind_path("item.title"),
            BoundValue::Binding {
                path: "items[1].title".into(),
                current: StateValue::from("b"),
            }
        );
        assert_eq!(ctx.bind_path("i"), BoundValue::Literal(StateValue::Int(1)));
        ctx.pop_scope();
        assert!(ctx.scope().is_empty());
    }

    #[test]
    fn data_sources_and_unknown_ids() {
        let document = document();
        let state = state(&document);
        let actions = ActionResolverRegistry::with_defaults();
        let config = ResolverConfig::new();
        let mut ctx = ResolutionContext::new(&document, &state, &actions, &config);

        let fixed = ctx.data(&DataReference::Source { id: "fixed".into() });
        assert_eq!(fixed, BoundValue::Literal(StateValue::Int(7)));
        let who = ctx.data(&DataReference::Source { id: "who".into() });
        assert_eq!(who.binding_path(), Some("name"));
        let missing = ctx.data(&DataReference::Source { id: "nope".into() });
        assert_eq!(missing, BoundValue::Literal(StateValue::Null));
        assert_eq!(
            ctx.diagnostics(),
            &[ResolutionError::UnknownDataSource("nope".into())]
        );
    }

    #[test]
    fn unknown_style_keeps_inline_properties() {
        let document = document();
        let state = state(&document);
        let actions = ActionResolverRegistry::with_defaults();
        let config = ResolverConfig::new();
        let mut ctx = ResolutionContext::new(&document, &state, &actions, &config);

        let inline = StyleProperties {
            opacity: Some(0.5),
            ..Default::default()
        };
        let style = ctx.flat_style_with(Some("ghost"), Some(&inline), NodeOverrides::default());
        assert_eq!(style.opacity, 0.5);
        assert_eq!(style.font_size, None);
        assert_eq!(style.padding, EdgeInsets::ZERO);
        assert_eq!(
            ctx.diagnostics(),
            &[ResolutionError::UnknownStyle("ghost".into())]
        );

        let title = ctx.resolve_style(Some("title"), None);
        assert_eq!(title.font_size, Some(24.0));
        assert_eq!(title.text_color.as_deref(), Some("gray"));
    }

    #[test]
    fn action_references() {
        let document = document();
        let state = state(&document);
        let actions = ActionResolverRegistry::with_defaults();
        let config = ResolverConfig::new();
        let mut ctx = ResolutionContext::new(&document, &state, &actions, &config);

        assert_eq!(
            ctx.action_ref(&ActionBinding::Reference("save".into())),
            ActionRef::Named("save".into())
        );
        assert_eq!(
            ctx.action_ref(&ActionBinding::Reference("missing".into())),
            ActionRef::Inline(ResolvedAction::noop())
        );
        let broken = ctx.action_ref(&ActionBinding::Inline(Action::new("setState")));
        assert_eq!(broken, ActionRef::Inline(ResolvedAction::noop()));
        assert_eq!(ctx.diagnostics().len(), 2);
    }

    #[test]
    fn depth_guard() {
        let document = document();
        let state = state(&document);
        let actions = ActionResolverRegistry::with_defaults();
        let config = ResolverConfig::new().with_max_depth(1);
        let mut ctx = ResolutionContext::new(&document, &state, &actions, &config);
        ctx.enter().unwrap();
        assert_eq!(ctx.enter(), Err(ResolutionError::DepthExceeded { limit: 1 }));
        ctx.leave();
        assert_eq!(ctx.depth(), 0);
    }
}
