use crate::shared::entity::{Entity, ID};

/// Alias of the category unknown aliases fall back to
pub const FALLBACK_CATEGORY_ALIAS: &str = "прочее";

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: ID,
    pub codename: String,
    pub name: String,
    /// Lowercase words that select this category in chat input
    pub aliases: Vec<String>,
    pub is_base_expense: bool,
}

impl Category {
    /// Builds a category whose aliases are lowercased and include its own name
    pub fn new(codename: &str, name: &str, aliases: &[&str], is_base_expense: bool) -> Self {
        let mut normalized: Vec<String> = aliases.iter().map(|a| a.trim().to_lowercase()).collect();
        let own_name = name.to_lowercase();
        if !normalized.contains(&own_name) {
            normalized.push(own_name);
        }
        Self {
            id: 0,
            codename: codename.to_string(),
            name: name.to_string(),
            aliases: normalized,
            is_base_expense,
        }
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        let alias = alias.trim().to_lowercase();
        self.aliases.iter().any(|a| *a == alias)
    }
}

impl Entity for Category {
    fn id(&self) -> ID {
        self.id
    }
}

/// Picks the category for `alias`, falling back to the "other" category
pub fn resolve_category<'a>(categories: &'a [Category], alias: &str) -> Option<&'a Category> {
    categories
        .iter()
        .find(|c| c.has_alias(alias))
        .or_else(|| categories.iter().find(|c| c.has_alias(FALLBACK_CATEGORY_ALIAS)))
}

/// Catalogue seeded into an empty store
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "products",
            "продукты",
            &["еда", "окей", "рынок", "овощи", "мясо", "фрукты"],
            true,
        ),
        Category::new(
            "medicine",
            "здоровье",
            &["медицина", "аптека", "таблетки", "доктор", "анализы", "лекарства"],
            true,
        ),
        Category::new(
            "connection",
            "связь",
            &["интернет", "мобильная связь", "мегафон", "домру"],
            true,
        ),
        Category::new(
            "animals",
            "животные",
            &[
                "собака",
                "кошка",
                "ветеринарный врач",
                "ветлечебница",
                "вкусняшки",
                "кинолог",
            ],
            true,
        ),
        Category::new("fuel", "топливо", &["бензин", "лукойл", "заправка"], true),
        Category::new("car", "машина", &["сервис", "то", "страховка", "мойка"], false),
        Category::new(
            "entertainment",
            "развлечение",
            &["кино", "каток", "картинг", "парк", "игры", "гости"],
            false,
        ),
        Category::new(
            "cafe",
            "кафе",
            &[
                "ресторан",
                "рест",
                "мак",
                "макдоналдс",
                "макдак",
                "kfc",
                "кфс",
                "пицца",
                "суши",
                "гирос",
                "шаурма",
                "бургеры",
            ],
            false,
        ),
        Category::new("trip", "путешествие", &["поездка"], false),
        Category::new("gift", "подарки", &[], false),
        Category::new("credit", "кредит", &[], true),
        Category::new("appliance", "техника", &["днс"], false),
        Category::new("other", "прочее", &[], false),
        Category::new("books", "книги", &[], false),
        Category::new("taxi", "такси", &[], false),
        Category::new("cloth", "одежда", &[], false),
        Category::new("sport", "спорт", &["айкидо", "спортзал", "зал"], false),
        Category::new("home", "дом", &["леруа", "ремонт"], false),
    ]
}
