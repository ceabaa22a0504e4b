//! Static word pool.
//!
//! Each entry is `(word, hint, hint_detail)`: the secret word everyone else
//! receives, the terse hint shown to the impostor in round 1, and the richer
//! second-tier hint that unlocks from round 2 onwards. Entries are never
//! mutated during a match; selection happens once at game start.

use crate::types::WordEntry;
use rand::Rng;

const POOL: &[(&str, &str, &str)] = &[
    ("Pizza", "Triangel", "Italienischer Klassiker, oft in Dreiecke geschnitten"),
    ("Katze", "Neun Leben", "Haustier, das angeblich immer auf den Pfoten landet"),
    ("Auto", "Benzinpreis", "Vier Räder, steht meistens im Stau"),
    ("Baum", "Ringe zählen", "Wird mit jedem Jahr einen Ring dicker"),
    ("Strand", "Muscheln sammeln", "Sand zwischen den Zehen, Salz in der Luft"),
    ("Buch", "Eselsohren", "Hat Seiten, die man umblättern kann"),
    ("Kaffee", "Bohnenland", "Heißes Getränk gegen den Montagmorgen"),
    ("Musik", "Sieben Noten", "Kommt aus Lautsprechern und bleibt im Ohr"),
    ("Schule", "Pausenhof", "Ort mit Klingel, Tafel und Hausaufgaben"),
    ("Computer", "Binärcode", "Rechnet nur mit Nullen und Einsen"),
    ("Telefon", "Klingelton", "Klingelt immer im falschen Moment"),
    ("Sonne", "Vitamin D", "Gelber Stern, um den sich hier alles dreht"),
    ("Regen", "Tropfenform", "Fällt vom Himmel und macht nass"),
    ("Haus", "Dachziegel", "Hat Wände, Fenster und eine Tür"),
    ("Garten", "Gnome", "Grünes Reich hinter dem Haus, oft mit Zwergen"),
    ("Film", "24 Frames", "Läuft im Kino mit Popcorn dazu"),
    ("Sport", "Fairplay", "Bringt einen ins Schwitzen, hat Regeln"),
    ("Urlaub", "Souvenirs", "Die schönsten Wochen des Jahres"),
    ("Familie", "Stammbaum", "Die Leute, die man sich nicht aussuchen kann"),
    ("Freunde", "Vertrauen", "Die Leute, die man sich aussuchen kann"),
    ("Arbeit", "Montag Blues", "Füllt die Zeit zwischen den Wochenenden"),
    ("Spiel", "Regelheft", "Hat Gewinner, Verlierer und Regeln"),
    ("Essen", "Tischmanieren", "Dreimal am Tag, mit Messer und Gabel"),
    ("Schlaf", "Traumfänger", "Acht Stunden davon sollen gesund sein"),
    ("Zeit", "Ticktack", "Vergeht, rennt und heilt angeblich Wunden"),
    ("Geld", "Papierscheine", "Regiert die Welt, stinkt angeblich nicht"),
    ("Liebe", "Pfeil und Bogen", "Geht durch den Magen, trifft ins Herz"),
    ("Glück", "Zahl Dreizehn", "Hat man im Spiel oder in der Liebe"),
    ("Traum", "Sandmann", "Passiert nachts im Kopf"),
    ("Farbe", "Regenbogen", "Rot, Gelb und Blau gehören dazu"),
    ("Licht", "Geschwindigkeit", "Nichts ist schneller als es"),
    ("Fenster", "Glasscheibe", "Durchsichtiger Teil der Wand"),
    ("Tür", "Klinkenputzer", "Geht auf und zu, manchmal knallt sie"),
    ("Stuhl", "Vier Beine", "Möbelstück zum Daraufsitzen"),
    ("Tisch", "Tischdecke", "Möbelstück, an dem gegessen wird"),
    ("Bett", "Kopfkissen", "Möbelstück für die Nacht"),
    ("Küche", "Küchengeruch", "Raum, in dem gekocht wird"),
    ("Wasser", "H2O", "Durchsichtig, nass, lebenswichtig"),
    ("Feuer", "Prometheus", "Heiß, hell, gefährlich"),
    ("Luft", "Sauerstoff", "Unsichtbar, aber man braucht sie ständig"),
    ("Erde", "Blauer Planet", "Dritter Planet von der Sonne"),
    ("Himmel", "Wolkenkratzer", "Oben, blau, voller Wolken"),
    ("Stern", "Lichtjahre", "Funkelt nachts am Himmel"),
    ("Mond", "Neil Armstrong", "Begleiter der Erde, mal voll, mal halb"),
    ("Blume", "Bienenstich", "Blüht, duftet, lockt Insekten an"),
    ("Vogel", "Federleicht", "Fliegt, zwitschert, baut Nester"),
    ("Fisch", "Wasser atmen", "Schwimmt und hat Kiemen"),
    ("Hund", "Bester Freund", "Bellt, holt Stöckchen, wedelt"),
    ("Pferd", "Trojanisch", "Galoppiert, wiehert, trägt Reiter"),
    ("Kuh", "Milchstraße", "Steht auf der Weide und gibt Milch"),
    ("Huhn", "Oder Ei zuerst", "Gackert und legt jeden Tag eines"),
    ("Apfel", "Newton", "Fiel angeblich einem Physiker auf den Kopf"),
    ("Banane", "Kalium", "Gelb, krumm, leicht zu schälen"),
    ("Brot", "Täglich geben", "Kommt frisch vom Bäcker"),
    ("Käse", "Löcher haben", "Milchprodukt, das Mäuse angeblich lieben"),
    ("Milch", "Weiße Flüssigkeit", "Kommt von der Kuh ins Müsli"),
    ("Zucker", "Süße Würfel", "Macht Kaffee und Kuchen süß"),
    ("Salz", "Weißes Gold", "Steht neben dem Pfeffer auf dem Tisch"),
    ("Schokolade", "Azteken", "Süß, braun, schmilzt in der Sonne"),
    ("Kuchen", "Geburtstag", "Gebäck mit Kerzen einmal im Jahr"),
    ("Eis", "Titanic Problem", "Kalt, süß, schmilzt in der Waffel"),
    ("Tee", "Boston Party", "Heißes Getränk aus Blättern"),
    ("Wein", "Trauben Destiny", "Rot oder weiß, reift im Fass"),
    ("Bier", "Oktoberfest", "Gehopft, gebraut, mit Schaumkrone"),
    ("Brille", "Klare Sicht", "Sitzt auf der Nase und hilft den Augen"),
    ("Hut", "Kopfschmuck", "Sitzt oben und schützt vor Sonne"),
    ("Schuhe", "Zwei Stück", "Trägt man paarweise an den Füßen"),
    ("Uhr", "Zeit anzeigen", "Hat Zeiger oder Ziffern am Handgelenk"),
    ("Ring", "Ewigkeit Symbol", "Rund, glänzend, steckt am Finger"),
    ("Koffer", "Reise Begleiter", "Wird vor dem Urlaub gepackt"),
    ("Regenschirm", "Wetter Schutz", "Klappt auf, wenn es von oben kommt"),
    ("Schlüssel", "Zugang gewähren", "Passt in ein Schloss und dreht sich"),
    ("Spiegel", "Schneewittchen", "Zeigt einem das eigene Gesicht"),
    ("Kamera", "1000 Worte", "Macht Bilder auf Knopfdruck"),
    ("Fahrrad", "Zwei Räder", "Fährt mit Muskelkraft und Kette"),
    ("Bus", "Öffentlich fahren", "Hält an jeder Haltestelle"),
    ("Zug", "Schiene folgen", "Fährt auf Gleisen, selten pünktlich"),
    ("Flugzeug", "Wright Brothers", "Hebt ab und fliegt über den Wolken"),
    ("Schiff", "Titanic Typ", "Schwimmt auf dem Meer, hat einen Anker"),
    ("Brücke", "Verbindung schaffen", "Führt über Flüsse und Täler"),
    ("Straße", "Asphalt Weg", "Asphaltiert, mit Streifen markiert"),
    ("Park", "Grüne Oase", "Grünfläche mit Bänken mitten in der Stadt"),
    ("See", "Stehend Wasser", "Stilles Gewässer zum Baden"),
    ("Fluss", "Fließend Wasser", "Fließt vom Berg bis ins Meer"),
    ("Berg", "Höchster Punkt", "Hoch, steinig, mit Gipfelkreuz"),
    ("Wald", "Baum Sammlung", "Viele Bäume, Moos und Pilze"),
    ("Schnee", "Weiße Flocken", "Fällt im Winter und bleibt weiß liegen"),
    ("Gewitter", "Zeus Zorn", "Erst der Blitz, dann der Donner"),
    ("Wind", "Unsichtbare Kraft", "Unsichtbar, aber treibt Mühlen an"),
    ("Nebel", "Grauer Schleier", "Grau, dicht, schluckt die Sicht"),
    ("Frühling", "Erste Jahreszeit", "Jahreszeit, in der alles blüht"),
    ("Sommer", "Heiße Jahreszeit", "Jahreszeit für Freibad und Eis"),
    ("Herbst", "Bunte Jahreszeit", "Jahreszeit der fallenden Blätter"),
    ("Winter", "Kalte Jahreszeit", "Jahreszeit mit Schal und Handschuhen"),
    ("Geburtstag", "Einmal jährlich", "Tag mit Kerzen, Kuchen und Geschenken"),
    ("Hochzeit", "Weißes Kleid", "Fest mit Ringen und Ja-Wort"),
    ("Weihnachten", "Dezember Fest", "Fest mit Baum und Geschenken im Dezember"),
    ("Ostern", "Buntes Ei", "Fest mit Hase und versteckten Eiern"),
    ("Party", "Laute Feier", "Laut, voll, geht bis in die Nacht"),
    ("Konzert", "Live Musik", "Musik auf der Bühne, Publikum davor"),
    ("Theater", "Bühne Show", "Vorhang auf, Applaus am Ende"),
    ("Museum", "Alte Sachen", "Alte Dinge hinter Glas, leise Räume"),
    ("Bibliothek", "Leise Zone", "Viele Regale, absolutes Flüstergebot"),
    ("Krankenhaus", "Weiße Kittel", "Hier arbeiten Leute in weißen Kitteln"),
    ("Supermarkt", "Einkaufs Center", "Regale, Einkaufswagen, Kassenschlange"),
    ("Restaurant", "Essen gehen", "Hier bestellt man von der Karte"),
    ("Hotel", "Übernachten", "Zimmer mit Frühstück und Rezeption"),
    ("Bank", "Geld aufbewahren", "Verwahrt Geld, verleiht es auch"),
    ("Polizei", "Gesetz hüten", "Kommt mit Blaulicht bei Notrufen"),
    ("Feuerwehr", "Rot Fahrzeug", "Rückt aus, wenn es brennt"),
    ("Zahnarzt", "Zahn Doktor", "Bittet einen, den Mund weit zu öffnen"),
    ("Friseur", "Haar schneiden", "Arbeitet mit Schere und Spiegel"),
    ("Bäcker", "Früh aufstehen", "Steht nachts auf, damit es morgens duftet"),
    ("Lehrer", "Wissen vermitteln", "Steht vorne an der Tafel"),
    ("Arzt", "Gesund machen", "Hört mit dem Stethoskop ab"),
    ("Pilot", "Himmel fahren", "Sitzt vorne im Cockpit"),
    ("Koch", "Essen zubereiten", "Schwingt den Löffel in der Küche"),
];

/// Pick one entry uniformly at random.
pub fn pick_random_entry() -> WordEntry {
    let mut rng = rand::rng();
    let (word, hint, hint_detail) = POOL[rng.random_range(0..POOL.len())];
    WordEntry {
        word,
        hint,
        hint_detail,
    }
}

/// Number of entries in the pool.
pub fn pool_size() -> usize {
    POOL.len()
}
