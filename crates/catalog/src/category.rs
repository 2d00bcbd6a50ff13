//! Product categories and the tree built from their flat rows.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use shopkeep_core::{CategoryId, DomainError, DomainResult, Entity};
use shopkeep_store::{Direction, Query, RemoteStore};

use crate::repo::{self, CatalogError, NewRecord, RemoteEntity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &CategoryId {
        &self.id
    }
}

impl RemoteEntity for Category {
    const TABLE: &'static str = "categories";
    const DEFAULT_ORDER: Option<(&'static str, Direction)> = Some(("name", Direction::Asc));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

impl NewRecord for NewCategory {
    type Entity = Category;

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("category name is required"));
        }
        Ok(())
    }
}

pub async fn list<S: RemoteStore + ?Sized>(store: &S) -> Result<Vec<Category>, CatalogError> {
    repo::list(store, Query::all()).await
}

pub async fn create<S: RemoteStore + ?Sized>(
    store: &S,
    new: &NewCategory,
) -> Result<Category, CatalogError> {
    repo::create(store, new).await
}

/// Fetch all categories and assemble the tree.
pub async fn load_tree<S: RemoteStore + ?Sized>(store: &S) -> Result<CategoryTree, CatalogError> {
    Ok(CategoryTree::build(list(store).await?))
}

/// Category hierarchy.
///
/// Built from untrusted rows: a category whose parent is missing becomes a
/// root, and any parent cycle is broken by promoting one member to a root,
/// so every input category appears exactly once.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: HashMap<CategoryId, Category>,
    parent: HashMap<CategoryId, Option<CategoryId>>,
    children: HashMap<CategoryId, Vec<CategoryId>>,
    roots: Vec<CategoryId>,
}

impl CategoryTree {
    pub fn build(categories: Vec<Category>) -> Self {
        let mut nodes: HashMap<CategoryId, Category> = HashMap::new();
        for category in categories {
            nodes.insert(category.id, category);
        }

        let mut parent: HashMap<CategoryId, Option<CategoryId>> = nodes
            .values()
            .map(|c| {
                let p = c
                    .parent_id
                    .filter(|p| *p != c.id && nodes.contains_key(p));
                (c.id, p)
            })
            .collect();

        // Break cycles: anything not reachable from a root sits on one.
        loop {
            let reachable = reachable_from_roots(&parent);
            let mut stranded: Vec<&Category> = nodes
                .values()
                .filter(|c| !reachable.contains(&c.id))
                .collect();
            if stranded.is_empty() {
                break;
            }
            stranded.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.as_uuid().cmp(b.id.as_uuid())));
            let promoted = stranded[0].id;
            tracing::warn!(
                "category {} is part of a parent cycle; treating it as a root",
                promoted
            );
            parent.insert(promoted, None);
        }

        let mut children: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
        let mut roots = Vec::new();
        for (id, p) in &parent {
            match p {
                Some(p) => children.entry(*p).or_default().push(*id),
                None => roots.push(*id),
            }
        }

        let by_name = |ids: &mut Vec<CategoryId>| {
            ids.sort_by(|a, b| {
                nodes[a]
                    .name
                    .to_lowercase()
                    .cmp(&nodes[b].name.to_lowercase())
                    .then(a.as_uuid().cmp(b.as_uuid()))
            })
        };
        by_name(&mut roots);
        for list in children.values_mut() {
            by_name(list);
        }

        Self {
            nodes,
            parent,
            children,
            roots,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.nodes.get(&id)
    }

    pub fn roots(&self) -> Vec<&Category> {
        self.roots.iter().map(|id| &self.nodes[id]).collect()
    }

    pub fn children(&self, id: CategoryId) -> Vec<&Category> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().map(|c| &self.nodes[c]).collect())
            .unwrap_or_default()
    }

    /// `id` and every category below it.
    pub fn subtree_ids(&self, id: CategoryId) -> HashSet<CategoryId> {
        let mut out = HashSet::new();
        if !self.nodes.contains_key(&id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if out.insert(next) {
                if let Some(kids) = self.children.get(&next) {
                    stack.extend(kids.iter().copied());
                }
            }
        }
        out
    }

    /// Breadcrumb from the root down to `id` (inclusive).
    pub fn path(&self, id: CategoryId) -> Vec<&Category> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(&id).map(|c| c.id);
        while let Some(cid) = current {
            path.push(&self.nodes[&cid]);
            current = self.parent.get(&cid).copied().flatten();
        }
        path.reverse();
        path
    }

    /// Pre-order walk as `(depth, category)`, for indented pickers.
    pub fn flatten(&self) -> Vec<(usize, &Category)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, CategoryId)> =
            self.roots.iter().rev().map(|id| (0, *id)).collect();
        while let Some((depth, id)) = stack.pop() {
            out.push((depth, &self.nodes[&id]));
            if let Some(kids) = self.children.get(&id) {
                stack.extend(kids.iter().rev().map(|k| (depth + 1, *k)));
            }
        }
        out
    }
}

fn reachable_from_roots(parent: &HashMap<CategoryId, Option<CategoryId>>) -> HashSet<CategoryId> {
    let mut children: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    let mut stack = Vec::new();
    for (id, p) in parent {
        match p {
            Some(p) => children.entry(*p).or_default().push(*id),
            None => stack.push(*id),
        }
    }
    let mut seen = HashSet::new();
    while let Some(id) = stack.pop() {
        if seen.insert(id) {
            if let Some(kids) = children.get(&id) {
                stack.extend(kids.iter().copied());
            }
        }
    }
    seen
}
