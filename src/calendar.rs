use std::cell::RefCell;
use std::collections::BTreeMap;

use time::Date;

use crate::error::TagError;
use crate::service::TagService;

/// One month's worth of day decorations: every tagged day mapped to its
/// tags' display names, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTags {
    pub year: i32,
    pub month: u8,
    pub days: BTreeMap<Date, Vec<String>>,
}

/// Read-through view of [`TagService::tagged_days_in_month`] that caches
/// the last month it produced.
///
/// Calendar rendering asks for the same month repeatedly while it is on
/// screen; the cache holds exactly one month and is dropped as soon as a
/// different month is requested or a mutation invalidates it. Association
/// CRUD paths never go through this cache.
pub struct MonthProjector<'a> {
    tags: &'a TagService,
    cached: RefCell<Option<MonthTags>>,
}

impl<'a> MonthProjector<'a> {
    pub fn new(tags: &'a TagService) -> Self {
        Self {
            tags,
            cached: RefCell::new(None),
        }
    }

    /// The tagged days of a month, served from cache when the month
    /// matches the last one requested.
    pub fn month(&self, year: i32, month: u8) -> Result<MonthTags, TagError> {
        if let Some(cached) = self.cached.borrow().as_ref()
            && cached.year == year
            && cached.month == month
        {
            return Ok(cached.clone());
        }

        let days = self.tags.tagged_days_in_month(year, month)?;
        let view = MonthTags { year, month, days };
        *self.cached.borrow_mut() = Some(view.clone());
        Ok(view)
    }

    /// Drops the cached month. Call after any association mutation that
    /// may touch the displayed month.
    pub fn invalidate(&self) {
        self.cached.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn service_with_tagged_days() -> TagService {
        let service = TagService::new(Database::in_memory().unwrap());
        let tag = service.create_or_get_tag("Vacation", None).unwrap();
        service.add_tag_to_day(tag.id, "2025-10-25").unwrap();
        service.add_tag_to_day(tag.id, "2025-10-26").unwrap();
        service
    }

    #[test]
    fn month_projects_tagged_days() {
        let service = service_with_tagged_days();
        let projector = MonthProjector::new(&service);

        let view = projector.month(2025, 10).unwrap();
        assert_eq!(view.days.len(), 2);
        let names: Vec<&Vec<String>> = view.days.values().collect();
        assert_eq!(names[0], &vec!["Vacation".to_string()]);
    }

    #[test]
    fn month_is_served_from_cache_until_invalidated() {
        let service = service_with_tagged_days();
        let projector = MonthProjector::new(&service);

        let before = projector.month(2025, 10).unwrap();

        // Mutate behind the cache: the stale view is still served.
        let tag = service.tag_by_name("vacation").unwrap().unwrap();
        service.add_tag_to_day(tag.id, "2025-10-27").unwrap();
        assert_eq!(projector.month(2025, 10).unwrap(), before);

        // Invalidation picks up the new association.
        projector.invalidate();
        let after = projector.month(2025, 10).unwrap();
        assert_eq!(after.days.len(), 3);
    }

    #[test]
    fn requesting_a_different_month_replaces_the_cache() {
        let service = service_with_tagged_days();
        let projector = MonthProjector::new(&service);

        projector.month(2025, 10).unwrap();
        let november = projector.month(2025, 11).unwrap();
        assert!(november.days.is_empty());

        let october = projector.month(2025, 10).unwrap();
        assert_eq!(october.days.len(), 2);
    }

    #[test]
    fn invalid_month_is_rejected() {
        let service = service_with_tagged_days();
        let projector = MonthProjector::new(&service);

        assert!(matches!(
            projector.month(2025, 13),
            Err(TagError::InvalidDate(_))
        ));
    }
}
