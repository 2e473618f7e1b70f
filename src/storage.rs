use crate::models::{Category, Component, NewComponent};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory component collection. Lives as long as the process; nothing is
/// written to disk.
pub struct ComponentStorage {
    components: RwLock<Vec<Component>>,
}

impl ComponentStorage {
    pub fn new() -> Self {
        Self {
            components: RwLock::new(Vec::new()),
        }
    }

    /// A store pre-populated with the sample catalog.
    pub fn with_samples() -> Self {
        let components = sample_components().into_iter().map(Component::new).collect();

        Self {
            components: RwLock::new(components),
        }
    }

    /// All components in insertion order, or only those in `category`.
    pub async fn list_components(&self, category: Option<&Category>) -> Vec<Component> {
        let components = self.components.read().await;

        match category {
            Some(category) => components
                .iter()
                .filter(|c| &c.category == category)
                .cloned()
                .collect(),
            None => components.clone(),
        }
    }

    pub async fn get_component(&self, id: &str) -> Option<Component> {
        let components = self.components.read().await;
        components.iter().find(|c| c.id == id).cloned()
    }

    pub async fn create_component(&self, data: NewComponent) -> Component {
        let mut components = self.components.write().await;

        let mut component = Component::new(data);
        while components.iter().any(|c| c.id == component.id) {
            component.id = Uuid::new_v4().to_string();
        }

        components.push(component.clone());
        component
    }

    pub async fn search_components(&self, query: &str) -> Vec<Component> {
        let components = self.components.read().await;

        components
            .iter()
            .filter(|c| c.matches_query(query))
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.components.read().await.len()
    }
}

impl Default for ComponentStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn sample(
    name: &str,
    category: &str,
    description: &str,
    code: &str,
    tags: &[&str],
    author: &str,
) -> NewComponent {
    NewComponent {
        name: name.to_string(),
        description: description.to_string(),
        category: Category::known(category),
        code: code.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        author_name: Some(author.to_string()),
        preview_image: None,
    }
}

fn sample_components() -> Vec<NewComponent> {
    vec![
        sample(
            "Material Button",
            "Buttons",
            "A beautiful Material Design button with ripple effect and customizable colors",
            MATERIAL_BUTTON,
            &["material", "button", "ripple"],
            "Android Team",
        ),
        sample(
            "Animated Card",
            "Cards",
            "An elevated card with smooth animations and hover effects",
            ANIMATED_CARD,
            &["animation", "card", "interactive"],
            "UI Designer",
        ),
        sample(
            "Bottom Navigation",
            "Navigation",
            "A clean bottom navigation bar with Material Design icons",
            BOTTOM_NAVIGATION,
            &["navigation", "bottom", "material"],
            "Navigation Expert",
        ),
        sample(
            "Fade In Animation",
            "Animations",
            "Smooth fade-in animation for any composable with customizable duration",
            FADE_IN_ANIMATION,
            &["animation", "fade", "alpha"],
            "Animation Studio",
        ),
    ]
}

const MATERIAL_BUTTON: &str = r#"@Composable
fun MaterialButton(
    text: String,
    onClick: () -> Unit,
    modifier: Modifier = Modifier,
    enabled: Boolean = true,
    colors: ButtonColors = ButtonDefaults.buttonColors()
) {
    Button(
        onClick = onClick,
        modifier = modifier,
        enabled = enabled,
        colors = colors,
        elevation = ButtonDefaults.buttonElevation(
            defaultElevation = 4.dp,
            pressedElevation = 8.dp
        )
    ) {
        Text(
            text = text,
            style = MaterialTheme.typography.button
        )
    }
}"#;

const ANIMATED_CARD: &str = r#"@Composable
fun AnimatedCard(
    modifier: Modifier = Modifier,
    onClick: () -> Unit = {},
    content: @Composable ColumnScope.() -> Unit
) {
    var isPressed by remember { mutableStateOf(false) }

    Card(
        modifier = modifier
            .scale(if (isPressed) 0.95f else 1f)
            .clickable(
                interactionSource = remember { MutableInteractionSource() },
                indication = null
            ) {
                onClick()
            }
            .pointerInput(Unit) {
                detectTapGestures(
                    onPress = {
                        isPressed = true
                        tryAwaitRelease()
                        isPressed = false
                    }
                )
            },
        elevation = CardDefaults.cardElevation(
            defaultElevation = if (isPressed) 2.dp else 6.dp
        )
    ) {
        Column(
            modifier = Modifier.padding(16.dp),
            content = content
        )
    }
}"#;

const BOTTOM_NAVIGATION: &str = r#"@Composable
fun BottomNavigation(
    items: List<BottomNavItem>,
    selectedItem: Int,
    onItemSelected: (Int) -> Unit,
    modifier: Modifier = Modifier
) {
    NavigationBar(modifier = modifier) {
        items.forEachIndexed { index, item ->
            NavigationBarItem(
                icon = {
                    Icon(
                        imageVector = if (selectedItem == index) item.selectedIcon else item.unselectedIcon,
                        contentDescription = item.label
                    )
                },
                label = { Text(item.label) },
                selected = selectedItem == index,
                onClick = { onItemSelected(index) },
                colors = NavigationBarItemDefaults.colors(
                    selectedIconColor = MaterialTheme.colorScheme.primary,
                    unselectedIconColor = MaterialTheme.colorScheme.onSurfaceVariant
                )
            )
        }
    }
}

data class BottomNavItem(
    val label: String,
    val selectedIcon: ImageVector,
    val unselectedIcon: ImageVector
)"#;

const FADE_IN_ANIMATION: &str = r#"@Composable
fun FadeInAnimation(
    durationMillis: Int = 300,
    delayMillis: Int = 0,
    content: @Composable () -> Unit
) {
    val alpha by animateFloatAsState(
        targetValue = 1f,
        animationSpec = tween(
            durationMillis = durationMillis,
            delayMillis = delayMillis,
            easing = FastOutSlowInEasing
        ),
        label = "fadeIn"
    )

    Box(
        modifier = Modifier.alpha(alpha)
    ) {
        content()
    }
}"#;
